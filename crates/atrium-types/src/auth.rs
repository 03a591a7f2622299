//! Authentication and session types.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// User
// ─────────────────────────────────────────────────────────────────────────────

/// A user snapshot attached to a session.
///
/// Immutable once issued; a new snapshot arrives with every token response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────────────────

/// Login request body for `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request body for `POST /auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Refresh request body for `POST /auth/refresh`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Token response
// ─────────────────────────────────────────────────────────────────────────────

/// Successful response from the login and refresh endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
    /// Unix timestamp (seconds) at which the access token expires.
    pub expires_at: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Session state
// ─────────────────────────────────────────────────────────────────────────────

/// The client-held record of the current authentication status.
///
/// Replaced wholesale on login, refresh, and logout; never patched field by
/// field. When `is_authenticated` is true, `access_token` and `expires_at`
/// are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    pub is_authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<u64>,
}

impl SessionState {
    /// The logged-out state.
    pub fn unauthenticated() -> Self {
        Self {
            is_authenticated: false,
            user: None,
            access_token: None,
            refresh_token: None,
            expires_at: None,
        }
    }

    /// Build an authenticated state from a token response.
    pub fn from_tokens(tokens: TokenResponse) -> Self {
        Self {
            is_authenticated: true,
            user: Some(tokens.user),
            access_token: Some(tokens.access_token),
            refresh_token: Some(tokens.refresh_token),
            expires_at: Some(tokens.expires_at),
        }
    }

    /// Whether the access token is expired at `now_secs` (Unix seconds).
    ///
    /// A missing expiry counts as expired.
    pub fn is_token_expired(&self, now_secs: u64) -> bool {
        match self.expires_at {
            Some(expires_at) => now_secs > expires_at,
            None => true,
        }
    }

    /// Presence check used by the navigation guard. Says nothing about
    /// validity; that is decided server-side per request.
    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::unauthenticated()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors on the wire
// ─────────────────────────────────────────────────────────────────────────────

/// Error codes returned by the authentication endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthCode {
    InvalidCredentials,
    AccountLocked,
    UnverifiedEmail,
    /// Bad or expired refresh token.
    Unauthorized,
    InternalServerError,
}

impl std::fmt::Display for AuthCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AuthCode::InvalidCredentials => "INVALID_CREDENTIALS",
            AuthCode::AccountLocked => "ACCOUNT_LOCKED",
            AuthCode::UnverifiedEmail => "UNVERIFIED_EMAIL",
            AuthCode::Unauthorized => "UNAUTHORIZED",
            AuthCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        };
        f.write_str(s)
    }
}

/// The `{code, message}` body returned on login/refresh failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRejection {
    pub code: AuthCode,
    pub message: String,
}

impl AuthRejection {
    pub fn new(code: AuthCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for AuthRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}
