//! Domain error types.

use thiserror::Error;
use uuid::Uuid;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The caller supplied an action the resolver does not recognize.
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// A record was not found.
    #[error("request not found: {0}")]
    NotFound(Uuid),

    /// The caller is not allowed to perform this action.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The record is not in a state that permits the requested transition.
    #[error("request cannot be modified in its current state: {current}")]
    InvalidStateTransition {
        /// The status the record actually holds.
        current: String,
    },

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
