//! Commands for the crossover context.

use mythcodex_core::command::Command;
use uuid::Uuid;

use super::requests::{RequestType, RespondAction};

/// Command to create a new crossover request.
#[derive(Debug, Clone)]
pub struct CreateRequest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The proposing user.
    pub requester_id: Uuid,
    /// The user whose mythology is being approached.
    pub target_user_id: Uuid,
    /// The requester's mythology.
    pub requester_mythology_id: Uuid,
    /// The target's mythology.
    pub target_mythology_id: Uuid,
    /// The kind of interaction proposed.
    pub request_type: RequestType,
    /// Optional note from the requester.
    pub message: Option<String>,
}

impl Command for CreateRequest {
    fn command_type(&self) -> &'static str {
        "crossover.create_request"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to resolve a pending crossover request.
#[derive(Debug, Clone)]
pub struct RespondToRequest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The request being resolved.
    pub request_id: Uuid,
    /// The authenticated caller.
    pub caller_id: Uuid,
    /// Accept, decline, or cancel.
    pub action: RespondAction,
    /// Optional free text from the responder.
    pub response_message: Option<String>,
}

impl Command for RespondToRequest {
    fn command_type(&self) -> &'static str {
        "crossover.respond_to_request"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to delete a resolved crossover request.
#[derive(Debug, Clone)]
pub struct DeleteRequest {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The request to remove.
    pub request_id: Uuid,
    /// The authenticated caller.
    pub caller_id: Uuid,
}

impl Command for DeleteRequest {
    fn command_type(&self) -> &'static str {
        "crossover.delete_request"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
