use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use crate::app::services::{INVALID_ID, ServiceError};

pub const INVALID_BODY: &str = "Invalid request body";

pub fn service_error_to_response(err: ServiceError) -> axum::response::Response {
    match err {
        ServiceError::InvalidInput(msg) => {
            tracing::debug!(error = %msg, "rejected client input");
            json_error(StatusCode::BAD_REQUEST, "invalid_input", msg)
        }
        ServiceError::NotFound(msg) => json_error(StatusCode::NOT_FOUND, "not_found", msg),
        ServiceError::InsufficientStock {
            requested,
            available,
        } => {
            tracing::debug!(requested, available, "insufficient stock");
            json_error(
                StatusCode::BAD_REQUEST,
                "insufficient_stock",
                "Insufficient stock",
            )
        }
        // Already logged with detail where it was classified.
        ServiceError::Internal(_) => json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal_error",
            "Internal server error",
        ),
    }
}

/// Unparseable JSON, wrong field types, or a missing JSON content type.
pub fn body_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    tracing::debug!(error = %rejection.body_text(), "rejected request body");
    json_error(StatusCode::BAD_REQUEST, "invalid_input", INVALID_BODY)
}

/// A path segment axum could not decode, such as percent-encoded bytes that are not UTF-8.
pub fn path_rejection_to_response(rejection: PathRejection) -> axum::response::Response {
    tracing::debug!(error = %rejection.body_text(), "rejected path id");
    json_error(StatusCode::BAD_REQUEST, "invalid_input", INVALID_ID)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": message.into(),
            "code": code,
        })),
    )
        .into_response()
}
