//! API error type with automatic HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use taskwall_core::codec::DecodeError;

use crate::store::StoreError;

#[derive(Debug)]
pub enum ApiError {
    /// Payload failed to decode (400)
    Decode(DecodeError),

    /// Resource not found (404)
    NotFound { resource: &'static str, id: i64 },

    /// Position already taken within its scope (409)
    Conflict(String),

    /// Storage failure (500, logged; no internal detail leaks)
    Internal(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            Self::Decode(e) => (
                StatusCode::BAD_REQUEST,
                json!({
                    "error": "bad_request",
                    "message": e.to_string()
                }),
            ),
            Self::NotFound { resource, id } => (
                StatusCode::NOT_FOUND,
                json!({
                    "error": "not_found",
                    "message": format!("{} {} not found", resource, id)
                }),
            ),
            Self::Conflict(message) => (
                StatusCode::CONFLICT,
                json!({
                    "error": "conflict",
                    "message": message
                }),
            ),
            Self::Internal(e) => {
                tracing::error!("store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({
                        "error": "internal_error",
                        "message": "an internal error occurred"
                    }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<DecodeError> for ApiError {
    fn from(e: DecodeError) -> Self {
        Self::Decode(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicatePosition(position) => {
                Self::Conflict(format!("position {} is already taken", position))
            }
            StoreError::MissingColumn(id) => Self::NotFound {
                resource: "column",
                id,
            },
            other => Self::Internal(other),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
