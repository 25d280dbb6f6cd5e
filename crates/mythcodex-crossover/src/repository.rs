//! Crossover repository port.

use async_trait::async_trait;
use uuid::Uuid;

use mythcodex_core::error::DomainError;

use crate::domain::alliances::{MythologyAlliance, MythologyPair};
use crate::domain::requests::{CrossoverRequest, ResponseOutcome};
use crate::domain::stories::CrossoverStory;

/// Which side of a request a listing is filtered on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Requests addressed to the user (`target_user_id = user`).
    Incoming,
    /// Requests the user sent (`requester_id = user`).
    Outgoing,
}

/// Repository trait for crossover requests and the records materialized
/// from them.
///
/// `apply_response` is the resolver's single write: implementations must
/// make the status transition conditional on the request still being
/// `pending` (failing the loser of a concurrent resolution with
/// `InvalidStateTransition`) and commit the acceptance side effect
/// atomically with it, or not at all.
#[async_trait]
pub trait CrossoverRepository: Send + Sync {
    /// Inserts a new pending request.
    async fn insert_request(&self, request: &CrossoverRequest) -> Result<(), DomainError>;

    /// Loads a request by id.
    async fn find_request(&self, id: Uuid) -> Result<Option<CrossoverRequest>, DomainError>;

    /// Lists a user's requests on one side, newest first.
    async fn list_requests(
        &self,
        user_id: Uuid,
        direction: Direction,
    ) -> Result<Vec<CrossoverRequest>, DomainError>;

    /// Applies a resolution: conditional status transition plus the
    /// acceptance side effect, atomically. Returns the updated request.
    async fn apply_response(
        &self,
        outcome: &ResponseOutcome,
    ) -> Result<CrossoverRequest, DomainError>;

    /// Removes a request row.
    async fn delete_request(&self, id: Uuid) -> Result<(), DomainError>;

    /// Loads the alliance row for a canonical pair, if any.
    async fn find_alliance(
        &self,
        pair: MythologyPair,
    ) -> Result<Option<MythologyAlliance>, DomainError>;

    /// Lists active alliances touching a mythology, newest first.
    async fn list_alliances(
        &self,
        mythology_id: Uuid,
    ) -> Result<Vec<MythologyAlliance>, DomainError>;

    /// Lists crossover stories touching a mythology, newest first.
    async fn list_stories(&self, mythology_id: Uuid) -> Result<Vec<CrossoverStory>, DomainError>;
}
