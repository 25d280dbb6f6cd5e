//! PostgreSQL-backed storage for the crossover context.

pub mod pg_repository;
pub mod schema;
