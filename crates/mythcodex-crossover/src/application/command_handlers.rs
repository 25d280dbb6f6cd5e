//! Command handlers for the crossover context.
//!
//! Application-level functions that orchestrate domain logic: load the
//! request, let the domain decide, apply the decision through the
//! repository port.

use mythcodex_core::clock::Clock;
use mythcodex_core::command::Command;
use mythcodex_core::error::DomainError;
use tracing::info;
use uuid::Uuid;

use crate::domain::commands::{CreateRequest, DeleteRequest, RespondToRequest};
use crate::domain::requests::{CrossoverRequest, NewCrossoverRequest};
use crate::repository::CrossoverRepository;

/// Handles the `CreateRequest` command: validates the parties and inserts
/// a new pending request.
///
/// # Errors
///
/// Returns `DomainError::Validation` for a self-request or self-crossover,
/// or `DomainError::Infrastructure` if the insert fails.
pub async fn handle_create_request(
    command: &CreateRequest,
    clock: &dyn Clock,
    repo: &dyn CrossoverRepository,
) -> Result<CrossoverRequest, DomainError> {
    let input = NewCrossoverRequest::new(
        command.requester_id,
        command.target_user_id,
        command.requester_mythology_id,
        command.target_mythology_id,
        command.request_type,
        command.message.clone(),
    )?;
    let request = CrossoverRequest::create(input, Uuid::new_v4(), clock.now());

    repo.insert_request(&request).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        request_id = %request.id,
        request_type = %request.request_type,
        "crossover request created"
    );
    Ok(request)
}

/// Handles the `RespondToRequest` command: loads the request, resolves it
/// through the domain state machine, and applies the transition and any
/// acceptance side effect in one repository call.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the request does not exist,
/// `DomainError::Forbidden` if the caller may not take the action,
/// `DomainError::InvalidStateTransition` if the request is no longer
/// pending, or `DomainError::Infrastructure` if persistence fails.
pub async fn handle_respond(
    command: &RespondToRequest,
    clock: &dyn Clock,
    repo: &dyn CrossoverRepository,
) -> Result<CrossoverRequest, DomainError> {
    let request = repo
        .find_request(command.request_id)
        .await?
        .ok_or(DomainError::NotFound(command.request_id))?;

    let outcome = request.resolve(
        command.caller_id,
        command.action,
        command.response_message.clone(),
        clock.now(),
    )?;

    let updated = repo.apply_response(&outcome).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        request_id = %updated.id,
        action = %command.action,
        status = %updated.status,
        "crossover request resolved"
    );
    Ok(updated)
}

/// Handles the `DeleteRequest` command: either party removes a request
/// once it is no longer pending.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the request does not exist,
/// `DomainError::Forbidden` for non-parties,
/// `DomainError::InvalidStateTransition` while still pending, or
/// `DomainError::Infrastructure` if the delete fails.
pub async fn handle_delete_request(
    command: &DeleteRequest,
    repo: &dyn CrossoverRepository,
) -> Result<(), DomainError> {
    let request = repo
        .find_request(command.request_id)
        .await?
        .ok_or(DomainError::NotFound(command.request_id))?;

    request.ensure_deletable(command.caller_id)?;

    repo.delete_request(request.id).await?;

    info!(
        correlation_id = %command.correlation_id(),
        command = command.command_type(),
        request_id = %request.id,
        "crossover request deleted"
    );
    Ok(())
}

