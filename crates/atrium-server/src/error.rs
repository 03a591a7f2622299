//! Error types for the server.

use atrium_types::{AuthCode, AuthRejection};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Server error type.
#[derive(Debug, Error)]
pub enum ServerError {
    /// An auth endpoint rejected the request; the `{code, message}` body
    /// goes out unchanged.
    #[error("{0}")]
    AuthRejected(AuthRejection),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    /// 401 with `INVALID_CREDENTIALS`, the same body whether the email is
    /// unknown or the password wrong.
    pub fn invalid_credentials() -> Self {
        Self::AuthRejected(AuthRejection::new(
            AuthCode::InvalidCredentials,
            "Invalid email or password",
        ))
    }

    /// 401 with `UNAUTHORIZED` for a bad or expired refresh token.
    pub fn unauthorized_refresh() -> Self {
        Self::AuthRejected(AuthRejection::new(
            AuthCode::Unauthorized,
            "Invalid refresh token",
        ))
    }
}

/// Result type for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::AuthRejected(rejection) => {
                tracing::warn!(code = %rejection.code, "Auth request rejected");
                (StatusCode::UNAUTHORIZED, Json(rejection)).into_response()
            }
            ServerError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                let body = AuthRejection::new(
                    AuthCode::InternalServerError,
                    "An unexpected error occurred",
                );
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
        }
    }
}
