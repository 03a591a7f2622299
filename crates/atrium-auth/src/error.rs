//! Error types for the authentication flow.

use atrium_types::AuthRejection;

/// Result type alias for this crate.
pub type Result<T> = std::result::Result<T, AuthError>;

/// Errors that can occur in the authentication flow.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The auth endpoint rejected the request with a `{code, message}` body.
    /// The upstream code and message are surfaced unchanged.
    #[error("{0}")]
    Rejected(AuthRejection),

    /// The refresh endpoint failed. Callers treat this as "could not
    /// refresh" and fall back to a logged-out state.
    #[error("Token refresh failed")]
    RefreshFailed,

    /// Network/HTTP error.
    #[error("Network error: {0}")]
    Network(String),

    /// Session repository error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),
}

impl AuthError {
    /// The rejection carried by this error, if any.
    pub fn rejection(&self) -> Option<&AuthRejection> {
        match self {
            AuthError::Rejected(rejection) => Some(rejection),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(e: reqwest::Error) -> Self {
        AuthError::Network(e.to_string())
    }
}
