//! Routes for the crossover context.
//!
//! The PATCH handler is the resolver's transport adapter: it parses the
//! caller-supplied action string before touching storage, so an
//! unrecognized action is reported ahead of a missing request.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{
    Json, Router,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use mythcodex_crossover::application::{command_handlers, query_handlers};
use mythcodex_crossover::domain::alliances::{MythologyAlliance, RelationshipType};
use mythcodex_crossover::domain::commands::{CreateRequest, DeleteRequest, RespondToRequest};
use mythcodex_crossover::domain::requests::{
    CrossoverRequest, RequestStatus, RequestType, RespondAction,
};
use mythcodex_crossover::domain::stories::{CrossoverStory, StoryStatus};
use mythcodex_crossover::repository::Direction;

use crate::auth::Caller;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /requests.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    /// The user whose mythology is being approached.
    pub target_user_id: Uuid,
    /// The caller's mythology.
    pub requester_mythology_id: Uuid,
    /// The target's mythology.
    pub target_mythology_id: Uuid,
    /// The kind of interaction proposed.
    pub request_type: RequestType,
    /// Optional note to the target.
    pub message: Option<String>,
}

/// Request body for PATCH /requests/{id}.
///
/// `action` stays a plain string so unrecognized values surface as the
/// resolver's `invalid_action` error rather than a deserialization
/// failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondBody {
    /// `accept`, `decline`, or `cancel`.
    pub action: String,
    /// Optional free text shown to the requester.
    pub response_message: Option<String>,
}

/// Query parameters for GET /requests.
#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    /// Which side of the caller's requests to list.
    pub direction: DirectionParam,
}

/// Direction of a request listing.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DirectionParam {
    /// Requests addressed to the caller.
    Incoming,
    /// Requests the caller sent.
    Outgoing,
}

impl From<DirectionParam> for Direction {
    fn from(param: DirectionParam) -> Self {
        match param {
            DirectionParam::Incoming => Self::Incoming,
            DirectionParam::Outgoing => Self::Outgoing,
        }
    }
}

/// Query parameters for GET /alliances and GET /stories.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MythologyQuery {
    /// The mythology the listing is scoped to.
    pub mythology_id: Uuid,
}

/// JSON view of a crossover request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestView {
    /// Record id.
    pub id: Uuid,
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
    /// Lifecycle state.
    pub status: RequestStatus,
    /// Free text set when the target responds.
    pub response_message: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// When the request left pending.
    pub responded_at: Option<DateTime<Utc>>,
    /// When acceptance side effects finished materializing.
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<CrossoverRequest> for RequestView {
    fn from(request: CrossoverRequest) -> Self {
        Self {
            id: request.id,
            requester_id: request.requester_id,
            target_user_id: request.target_user_id,
            requester_mythology_id: request.requester_mythology_id,
            target_mythology_id: request.target_mythology_id,
            request_type: request.request_type,
            status: request.status,
            response_message: request.response_message,
            created_at: request.created_at,
            responded_at: request.responded_at,
            completed_at: request.completed_at,
        }
    }
}

/// JSON view of a mythology alliance.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllianceView {
    /// Record id.
    pub id: Uuid,
    /// Lower mythology id of the canonical pair.
    pub mythology1_id: Uuid,
    /// Higher mythology id of the canonical pair.
    pub mythology2_id: Uuid,
    /// Relationship kind.
    pub relationship_type: RelationshipType,
    /// Whether the relationship is in force.
    pub is_active: bool,
    /// The request that first formed this row.
    pub formed_from_request_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last retype/reactivation timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<MythologyAlliance> for AllianceView {
    fn from(alliance: MythologyAlliance) -> Self {
        Self {
            id: alliance.id,
            mythology1_id: alliance.mythology1_id,
            mythology2_id: alliance.mythology2_id,
            relationship_type: alliance.relationship_type,
            is_active: alliance.is_active,
            formed_from_request_id: alliance.formed_from_request_id,
            created_at: alliance.created_at,
            updated_at: alliance.updated_at,
        }
    }
}

/// JSON view of a crossover story.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryView {
    /// Record id.
    pub id: Uuid,
    /// Story title.
    pub title: String,
    /// Story type discriminator.
    pub story_type: String,
    /// Publication state.
    pub status: StoryStatus,
    /// The requester's mythology.
    pub mythology1_id: Uuid,
    /// The target's mythology.
    pub mythology2_id: Uuid,
    /// The requester.
    pub author1_id: Uuid,
    /// The target.
    pub author2_id: Uuid,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<CrossoverStory> for StoryView {
    fn from(story: CrossoverStory) -> Self {
        Self {
            id: story.id,
            title: story.title,
            story_type: story.story_type,
            status: story.status,
            mythology1_id: story.mythology1_id,
            mythology2_id: story.mythology2_id,
            author1_id: story.author1_id,
            author2_id: story.author2_id,
            created_at: story.created_at,
        }
    }
}

/// Response body wrapping a single request.
#[derive(Debug, Serialize)]
pub struct RequestResponse {
    /// The request record.
    pub request: RequestView,
}

/// Response body wrapping a request listing.
#[derive(Debug, Serialize)]
pub struct RequestListResponse {
    /// The request records, newest first.
    pub requests: Vec<RequestView>,
}

/// Response body wrapping an alliance listing.
#[derive(Debug, Serialize)]
pub struct AllianceListResponse {
    /// The alliance records, newest first.
    pub alliances: Vec<AllianceView>,
}

/// Response body wrapping a story listing.
#[derive(Debug, Serialize)]
pub struct StoryListResponse {
    /// The story records, newest first.
    pub stories: Vec<StoryView>,
}

/// Response body for DELETE /requests/{id}.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Always true on success.
    pub success: bool,
}

/// POST /requests
#[instrument(skip(state, body), fields(caller_id = %caller.0))]
async fn create_request(
    State(state): State<AppState>,
    caller: Caller,
    Json(body): Json<CreateRequestBody>,
) -> Result<(StatusCode, Json<RequestResponse>), ApiError> {
    let command = CreateRequest {
        correlation_id: Uuid::new_v4(),
        requester_id: caller.0,
        target_user_id: body.target_user_id,
        requester_mythology_id: body.requester_mythology_id,
        target_mythology_id: body.target_mythology_id,
        request_type: body.request_type,
        message: body.message,
    };

    info!(correlation_id = %command.correlation_id, "handling create_request command");

    let request =
        command_handlers::handle_create_request(&command, state.clock.as_ref(), &*state.repository)
            .await?;

    Ok((
        StatusCode::CREATED,
        Json(RequestResponse {
            request: request.into(),
        }),
    ))
}

/// GET /requests?direction=incoming|outgoing
#[instrument(skip(state), fields(caller_id = %caller.0))]
async fn list_requests(
    State(state): State<AppState>,
    caller: Caller,
    Query(query): Query<ListRequestsQuery>,
) -> Result<Json<RequestListResponse>, ApiError> {
    let requests = query_handlers::list_requests_for_user(
        caller.0,
        query.direction.into(),
        &*state.repository,
    )
    .await?;

    Ok(Json(RequestListResponse {
        requests: requests.into_iter().map(Into::into).collect(),
    }))
}

/// GET /requests/{id}
#[instrument(skip(state), fields(caller_id = %caller.0, request_id = %request_id))]
async fn get_request(
    State(state): State<AppState>,
    caller: Caller,
    Path(request_id): Path<Uuid>,
) -> Result<Json<RequestResponse>, ApiError> {
    let request = query_handlers::get_request(request_id, caller.0, &*state.repository).await?;

    Ok(Json(RequestResponse {
        request: request.into(),
    }))
}

/// PATCH /requests/{id}
#[instrument(skip(state, body), fields(caller_id = %caller.0, request_id = %request_id))]
async fn respond_to_request(
    State(state): State<AppState>,
    caller: Caller,
    Path(request_id): Path<Uuid>,
    Json(body): Json<RespondBody>,
) -> Result<Json<RequestResponse>, ApiError> {
    // Step 1 of the resolver contract: an unrecognized action fails
    // before the request is even looked up.
    let action = RespondAction::parse(&body.action)?;

    let command = RespondToRequest {
        correlation_id: Uuid::new_v4(),
        request_id,
        caller_id: caller.0,
        action,
        response_message: body.response_message,
    };

    info!(correlation_id = %command.correlation_id, action = %action, "handling respond command");

    let request =
        command_handlers::handle_respond(&command, state.clock.as_ref(), &*state.repository)
            .await?;

    Ok(Json(RequestResponse {
        request: request.into(),
    }))
}

/// DELETE /requests/{id}
#[instrument(skip(state), fields(caller_id = %caller.0, request_id = %request_id))]
async fn delete_request(
    State(state): State<AppState>,
    caller: Caller,
    Path(request_id): Path<Uuid>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let command = DeleteRequest {
        correlation_id: Uuid::new_v4(),
        request_id,
        caller_id: caller.0,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_request command");

    command_handlers::handle_delete_request(&command, &*state.repository).await?;

    Ok(Json(DeleteResponse { success: true }))
}

/// GET /alliances?mythologyId={id}
#[instrument(skip(state))]
async fn list_alliances(
    State(state): State<AppState>,
    Query(query): Query<MythologyQuery>,
) -> Result<Json<AllianceListResponse>, ApiError> {
    let alliances =
        query_handlers::list_alliances_for_mythology(query.mythology_id, &*state.repository)
            .await?;

    Ok(Json(AllianceListResponse {
        alliances: alliances.into_iter().map(Into::into).collect(),
    }))
}

/// GET /stories?mythologyId={id}
#[instrument(skip(state))]
async fn list_stories(
    State(state): State<AppState>,
    Query(query): Query<MythologyQuery>,
) -> Result<Json<StoryListResponse>, ApiError> {
    let stories =
        query_handlers::list_stories_for_mythology(query.mythology_id, &*state.repository).await?;

    Ok(Json(StoryListResponse {
        stories: stories.into_iter().map(Into::into).collect(),
    }))
}

/// Returns the router for the crossover context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/requests", post(create_request).get(list_requests))
        .route(
            "/requests/{id}",
            get(get_request)
                .patch(respond_to_request)
                .delete(delete_request),
        )
        .route("/alliances", get(list_alliances))
        .route("/stories", get(list_stories))
}
