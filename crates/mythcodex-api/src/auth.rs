//! Caller identity extraction.
//!
//! Authentication happens at the upstream gateway; handlers trust the
//! user id header it sets. A missing or malformed header is rejected
//! with 401 before any handler runs.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::error::ErrorBody;

/// Identity header set by the gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller of a request.
#[derive(Debug, Clone, Copy)]
pub struct Caller(pub Uuid);

/// 401 rejection for a missing or malformed identity header.
#[derive(Debug)]
pub struct Unauthorized;

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: "unauthorized",
            message: format!("missing or invalid {USER_ID_HEADER} header"),
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = Unauthorized;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value).ok())
            .map(Caller)
            .ok_or(Unauthorized)
    }
}
