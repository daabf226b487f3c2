//! Error Types
//!
//! Centralized error handling for all authentication operations.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

/// Authentication errors
///
/// The variants map one-to-one onto the HTTP statuses the service emits.
/// `Unauthorized` carries a single fixed message regardless of whether the
/// user is unknown, inactive, or supplied a wrong password.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Too many login attempts, please try again later")]
    RateLimited { retry_after: u64 },

    #[error("Service temporarily unavailable")]
    Unavailable,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error")]
    Internal,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AuthError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", msg.clone())
            }
            AuthError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                self.to_string(),
            ),
            AuthError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", self.to_string()),
            AuthError::RateLimited { retry_after } => {
                // Retry-After tells well-behaved clients when the window reopens.
                return (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, retry_after.to_string())],
                    Json(serde_json::json!({
                        "error": "rate_limited",
                        "message": self.to_string(),
                        "retry_after": retry_after
                    })),
                )
                    .into_response();
            }
            AuthError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                self.to_string(),
            ),
            AuthError::Database(_) | AuthError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "An internal error occurred".to_string(),
            ),
        };

        (
            status,
            Json(serde_json::json!({
                "error": error_code,
                "message": message
            })),
        )
            .into_response()
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        tracing::error!("Password hashing error: {:?}", err);
        AuthError::Internal
    }
}
