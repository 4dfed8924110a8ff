use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Service error taxonomy.
///
/// `Database` covers every persistence failure (store unreachable,
/// constraint violation, query failure); it is always surfaced to the
/// caller and never retried inside the service. `Encoding` is raised
/// before any store interaction when event metadata cannot be serialized,
/// so a malformed payload can never produce a partial write.
///
/// There is deliberately no `NotFound` variant for the summary path: an
/// unknown or eventless huddle yields a zero-valued summary, not an error.
#[derive(Debug, Error)]
pub enum HsError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

impl IntoResponse for HsError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            HsError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                // Generic message - don't leak store details to clients
                "An internal database error occurred".to_string(),
            ),
            HsError::Encoding(reason) => (
                StatusCode::BAD_REQUEST,
                "ENCODING_ERROR",
                format!("Event metadata could not be encoded: {reason}"),
            ),
            HsError::BadRequest(reason) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", reason.clone())
            }
            HsError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let error_response = ErrorResponse {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(error_response)).into_response()
    }
}
