//! Local authentication routes.
//!
//! Token issuance against the in-memory user directory. The wire contract
//! is shared with the external auth service: success bodies are
//! [`TokenResponse`], failures are `401 {code, message}`.

use atrium_types::{LoginRequest, RefreshRequest, TokenResponse};
use axum::{Json, Router, extract::State, routing::post};

use crate::error::{Result, ServerError};
use crate::state::{AppState, UserRecord};
use crate::token::{self, ACCESS_TOKEN_TTL_SECS, REFRESH_TOKEN_TTL_SECS};

/// Create the local auth routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login_handler))
        .route("/auth/logout", post(logout_handler))
        .route("/auth/refresh", post(refresh_handler))
}

/// Handle `POST /auth/login`.
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    let Some(record) = state.users.find_by_email(&request.email) else {
        return Err(ServerError::invalid_credentials());
    };

    if !record.verify_password(&request.password) {
        return Err(ServerError::invalid_credentials());
    }

    tracing::info!(user = %record.username, "Login succeeded");
    let access_token = token::issue(&state.keys, record, ACCESS_TOKEN_TTL_SECS)?;
    let refresh_token = token::issue(&state.keys, record, REFRESH_TOKEN_TTL_SECS)?;

    Ok(Json(token_response(record, access_token, refresh_token)))
}

/// Handle `POST /auth/refresh`.
///
/// A bad or garbled refresh token is an expected input, answered with
/// `401 UNAUTHORIZED`.
pub async fn refresh_handler(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenResponse>> {
    let Some(claims) = token::verify(&state.keys, &request.refresh_token) else {
        return Err(ServerError::unauthorized_refresh());
    };

    let Some(record) = state.users.find_by_id(&claims.sub) else {
        return Err(ServerError::unauthorized_refresh());
    };

    tracing::debug!(user = %record.username, "Access token refreshed");
    let access_token = token::issue(&state.keys, record, ACCESS_TOKEN_TTL_SECS)?;

    // The presented refresh token stays valid for its own lifetime.
    Ok(Json(token_response(
        record,
        access_token,
        request.refresh_token,
    )))
}

/// Handle `POST /auth/logout`.
///
/// Token invalidation is not modeled; the client clears its own state.
pub async fn logout_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "Logged out successfully" }))
}

fn token_response(record: &UserRecord, access_token: String, refresh_token: String) -> TokenResponse {
    TokenResponse {
        access_token,
        refresh_token,
        user: record.snapshot(),
        expires_at: token::now_secs() + ACCESS_TOKEN_TTL_SECS,
    }
}
