//! Integration tests for the crossover command handlers.
//!
//! These live in `tests/` rather than inline in the crate because they
//! depend on `mythcodex-test-support`, which itself depends on this crate.
//! An inline `#[cfg(test)]` module would compile this crate a second time
//! and the two copies' types would not unify; an integration test links
//! against the normal library build, the same one test-support uses.

use chrono::{TimeZone, Utc};
use uuid::Uuid;

use mythcodex_core::error::DomainError;
use mythcodex_test_support::{
    FailingCrossoverRepository, FixedClock, InMemoryCrossoverRepository,
};

use mythcodex_crossover::application::command_handlers::{
    handle_create_request, handle_delete_request, handle_respond,
};
use mythcodex_crossover::domain::alliances::{MythologyPair, RelationshipType};
use mythcodex_crossover::domain::commands::{CreateRequest, DeleteRequest, RespondToRequest};
use mythcodex_crossover::domain::requests::{
    CrossoverRequest, NewCrossoverRequest, RequestStatus, RequestType, RespondAction,
};
use mythcodex_crossover::domain::stories::{DEFAULT_STORY_TITLE, StoryStatus};
use mythcodex_crossover::repository::CrossoverRepository;

fn fixed_clock() -> FixedClock {
    FixedClock(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap())
}

fn pending_request(request_type: RequestType) -> CrossoverRequest {
    let input = NewCrossoverRequest::new(
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        Uuid::new_v4(),
        request_type,
        None,
    )
    .unwrap();
    CrossoverRequest::create(
        input,
        Uuid::new_v4(),
        Utc.with_ymd_and_hms(2026, 1, 14, 9, 0, 0).unwrap(),
    )
}

fn respond_command(
    request: &CrossoverRequest,
    caller_id: Uuid,
    action: RespondAction,
) -> RespondToRequest {
    RespondToRequest {
        correlation_id: Uuid::new_v4(),
        request_id: request.id,
        caller_id,
        action,
        response_message: None,
    }
}

#[tokio::test]
async fn test_create_request_inserts_pending_request() {
    // Arrange
    let repo = InMemoryCrossoverRepository::new();
    let clock = fixed_clock();
    let command = CreateRequest {
        correlation_id: Uuid::new_v4(),
        requester_id: Uuid::new_v4(),
        target_user_id: Uuid::new_v4(),
        requester_mythology_id: Uuid::new_v4(),
        target_mythology_id: Uuid::new_v4(),
        request_type: RequestType::Alliance,
        message: Some("join forces?".to_owned()),
    };

    // Act
    let request = handle_create_request(&command, &clock, &repo)
        .await
        .unwrap();

    // Assert
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.created_at, clock.0);
    let stored = repo.request(request.id).unwrap();
    assert_eq!(stored, request);
}

#[tokio::test]
async fn test_create_request_rejects_self_request() {
    let repo = InMemoryCrossoverRepository::new();
    let user = Uuid::new_v4();
    let command = CreateRequest {
        correlation_id: Uuid::new_v4(),
        requester_id: user,
        target_user_id: user,
        requester_mythology_id: Uuid::new_v4(),
        target_mythology_id: Uuid::new_v4(),
        request_type: RequestType::Trade,
        message: None,
    };

    let err = handle_create_request(&command, &fixed_clock(), &repo)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Validation(_)));
}

#[tokio::test]
async fn test_accept_alliance_creates_canonical_alliance_row() {
    // Arrange
    let repo = InMemoryCrossoverRepository::new();
    let clock = fixed_clock();
    let request = pending_request(RequestType::Alliance);
    repo.insert_request(&request).await.unwrap();
    let command = respond_command(&request, request.target_user_id, RespondAction::Accept);

    // Act
    let updated = handle_respond(&command, &clock, &repo).await.unwrap();

    // Assert
    assert_eq!(updated.status, RequestStatus::Accepted);
    assert_eq!(updated.responded_at, Some(clock.0));
    assert_eq!(updated.completed_at, Some(clock.0));

    let alliances = repo.alliances();
    assert_eq!(alliances.len(), 1);
    let alliance = &alliances[0];
    assert_eq!(
        alliance.pair(),
        MythologyPair::new(request.requester_mythology_id, request.target_mythology_id)
    );
    assert!(alliance.mythology1_id <= alliance.mythology2_id);
    assert_eq!(alliance.relationship_type, RelationshipType::Alliance);
    assert!(alliance.is_active);
    assert_eq!(alliance.formed_from_request_id, request.id);
}

#[tokio::test]
async fn test_requester_cannot_accept_own_request() {
    let repo = InMemoryCrossoverRepository::new();
    let request = pending_request(RequestType::Alliance);
    repo.insert_request(&request).await.unwrap();
    let command = respond_command(&request, request.requester_id, RespondAction::Accept);

    let err = handle_respond(&command, &fixed_clock(), &repo)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Forbidden(_)));
    // The record is unchanged.
    assert_eq!(
        repo.request(request.id).unwrap().status,
        RequestStatus::Pending
    );
}

#[tokio::test]
async fn test_responding_to_resolved_request_fails_and_leaves_it_unchanged() {
    let repo = InMemoryCrossoverRepository::new();
    let mut request = pending_request(RequestType::Alliance);
    request.status = RequestStatus::Declined;
    repo.insert_request(&request).await.unwrap();
    let command = respond_command(&request, request.target_user_id, RespondAction::Accept);

    let err = handle_respond(&command, &fixed_clock(), &repo)
        .await
        .unwrap_err();

    match err {
        DomainError::InvalidStateTransition { current } => assert_eq!(current, "declined"),
        other => panic!("expected InvalidStateTransition, got {other:?}"),
    }
    assert_eq!(repo.request(request.id).unwrap(), request);
    assert!(repo.alliances().is_empty());
}

#[tokio::test]
async fn test_reaccepting_same_pair_retypes_existing_row() {
    // A trade acceptance between mythologies with an existing
    // conflict row retypes it in place.
    let repo = InMemoryCrossoverRepository::new();
    let clock = fixed_clock();

    let first = pending_request(RequestType::Conflict);
    repo.insert_request(&first).await.unwrap();
    let command = respond_command(&first, first.target_user_id, RespondAction::Accept);
    handle_respond(&command, &clock, &repo).await.unwrap();

    // A second request between the same mythologies, opposite direction.
    let second_input = NewCrossoverRequest::new(
        first.target_user_id,
        first.requester_id,
        first.target_mythology_id,
        first.requester_mythology_id,
        RequestType::Trade,
        None,
    )
    .unwrap();
    let second = CrossoverRequest::create(second_input, Uuid::new_v4(), clock.0);
    repo.insert_request(&second).await.unwrap();
    let command = respond_command(&second, second.target_user_id, RespondAction::Accept);
    handle_respond(&command, &clock, &repo).await.unwrap();

    let alliances = repo.alliances();
    assert_eq!(alliances.len(), 1);
    let alliance = &alliances[0];
    assert_eq!(alliance.relationship_type, RelationshipType::TradePartners);
    assert!(alliance.is_active);
    // Provenance still points at the request that first formed the row.
    assert_eq!(alliance.formed_from_request_id, first.id);

    // The row is addressable by its canonical pair from either order.
    let pair = MythologyPair::new(first.target_mythology_id, first.requester_mythology_id);
    let found = repo.find_alliance(pair).await.unwrap().unwrap();
    assert_eq!(found.id, alliance.id);
}

#[tokio::test]
async fn test_accept_story_creates_single_draft_story() {
    let repo = InMemoryCrossoverRepository::new();
    let request = pending_request(RequestType::Story);
    repo.insert_request(&request).await.unwrap();
    let command = respond_command(&request, request.target_user_id, RespondAction::Accept);

    handle_respond(&command, &fixed_clock(), &repo).await.unwrap();

    let stories = repo.stories();
    assert_eq!(stories.len(), 1);
    let story = &stories[0];
    assert_eq!(story.status, StoryStatus::Draft);
    assert_eq!(story.title, DEFAULT_STORY_TITLE);
    assert_eq!(story.author1_id, request.requester_id);
    assert_eq!(story.author2_id, request.target_user_id);
    assert!(repo.alliances().is_empty());
}

#[tokio::test]
async fn test_decline_writes_response_message_and_no_side_effect() {
    let repo = InMemoryCrossoverRepository::new();
    let clock = fixed_clock();
    let request = pending_request(RequestType::Alliance);
    repo.insert_request(&request).await.unwrap();
    let command = RespondToRequest {
        correlation_id: Uuid::new_v4(),
        request_id: request.id,
        caller_id: request.target_user_id,
        action: RespondAction::Decline,
        response_message: Some("our pantheons clash".to_owned()),
    };

    let updated = handle_respond(&command, &clock, &repo).await.unwrap();

    assert_eq!(updated.status, RequestStatus::Declined);
    assert_eq!(updated.response_message.as_deref(), Some("our pantheons clash"));
    assert_eq!(updated.responded_at, Some(clock.0));
    assert!(updated.completed_at.is_none());
    assert!(repo.alliances().is_empty());
    assert!(repo.stories().is_empty());
}

#[tokio::test]
async fn test_respond_to_missing_request_returns_not_found() {
    let repo = InMemoryCrossoverRepository::new();
    let request_id = Uuid::new_v4();
    let command = RespondToRequest {
        correlation_id: Uuid::new_v4(),
        request_id,
        caller_id: Uuid::new_v4(),
        action: RespondAction::Accept,
        response_message: None,
    };

    let err = handle_respond(&command, &fixed_clock(), &repo)
        .await
        .unwrap_err();

    match err {
        DomainError::NotFound(id) => assert_eq!(id, request_id),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_respond_surfaces_repository_failure() {
    let repo = FailingCrossoverRepository;
    let command = RespondToRequest {
        correlation_id: Uuid::new_v4(),
        request_id: Uuid::new_v4(),
        caller_id: Uuid::new_v4(),
        action: RespondAction::Accept,
        response_message: None,
    };

    let err = handle_respond(&command, &fixed_clock(), &repo)
        .await
        .unwrap_err();

    assert!(matches!(err, DomainError::Infrastructure(_)));
}

#[tokio::test]
async fn test_delete_removes_resolved_request() {
    let repo = InMemoryCrossoverRepository::new();
    let mut request = pending_request(RequestType::Trade);
    request.status = RequestStatus::Cancelled;
    repo.insert_request(&request).await.unwrap();
    let command = DeleteRequest {
        correlation_id: Uuid::new_v4(),
        request_id: request.id,
        caller_id: request.target_user_id,
    };

    handle_delete_request(&command, &repo).await.unwrap();

    assert!(repo.request(request.id).is_none());
}

#[tokio::test]
async fn test_delete_pending_request_is_rejected() {
    let repo = InMemoryCrossoverRepository::new();
    let request = pending_request(RequestType::Trade);
    repo.insert_request(&request).await.unwrap();
    let command = DeleteRequest {
        correlation_id: Uuid::new_v4(),
        request_id: request.id,
        caller_id: request.requester_id,
    };

    let err = handle_delete_request(&command, &repo).await.unwrap_err();

    assert!(matches!(err, DomainError::InvalidStateTransition { .. }));
    assert!(repo.request(request.id).is_some());
}
