//! Query handlers for the crossover context.
//!
//! Read-only lookups over the repository port. Single-request reads are
//! restricted to the two parties; listings are scoped by the caller's own
//! id or a mythology id.

use mythcodex_core::error::DomainError;
use uuid::Uuid;

use crate::domain::alliances::MythologyAlliance;
use crate::domain::requests::CrossoverRequest;
use crate::domain::stories::CrossoverStory;
use crate::repository::{CrossoverRepository, Direction};

/// Retrieves a single request, visible only to its parties.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the request does not exist and
/// `DomainError::Forbidden` if the caller is not a party to it.
pub async fn get_request(
    request_id: Uuid,
    caller_id: Uuid,
    repo: &dyn CrossoverRepository,
) -> Result<CrossoverRequest, DomainError> {
    let request = repo
        .find_request(request_id)
        .await?
        .ok_or(DomainError::NotFound(request_id))?;
    if !request.is_party(caller_id) {
        return Err(DomainError::Forbidden(
            "you are not a party to this request".to_owned(),
        ));
    }
    Ok(request)
}

/// Lists a user's incoming or outgoing requests, newest first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the lookup fails.
pub async fn list_requests_for_user(
    user_id: Uuid,
    direction: Direction,
    repo: &dyn CrossoverRepository,
) -> Result<Vec<CrossoverRequest>, DomainError> {
    repo.list_requests(user_id, direction).await
}

/// Lists active alliances touching a mythology, newest first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the lookup fails.
pub async fn list_alliances_for_mythology(
    mythology_id: Uuid,
    repo: &dyn CrossoverRepository,
) -> Result<Vec<MythologyAlliance>, DomainError> {
    repo.list_alliances(mythology_id).await
}

/// Lists crossover stories touching a mythology, newest first.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if the lookup fails.
pub async fn list_stories_for_mythology(
    mythology_id: Uuid,
    repo: &dyn CrossoverRepository,
) -> Result<Vec<CrossoverStory>, DomainError> {
    repo.list_stories(mythology_id).await
}

