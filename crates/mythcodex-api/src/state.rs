//! Shared application state.

use std::sync::Arc;

use mythcodex_core::clock::Clock;
use mythcodex_crossover::repository::CrossoverRepository;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Crossover repository port.
    pub repository: Arc<dyn CrossoverRepository>,
    /// Clock used to stamp transitions.
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(repository: Arc<dyn CrossoverRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repository, clock }
    }
}
