//! Auth-service proxy routes.
//!
//! A stateless relay: the incoming body and relevant headers are forwarded
//! to the external authentication service and its status and body come back
//! verbatim. The only logic here is the split between the two failure
//! branches — upstream answered with an error (relay it) versus upstream
//! unreachable (synthesize a generic 500).

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};

use crate::state::AppState;

/// Headers copied through to the upstream service.
const FORWARDED_HEADERS: [&str; 2] = ["content-type", "authorization"];

/// Create the proxy routes, nested under `/api/v1`.
pub fn proxy_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(token_proxy))
        .route("/auth/register", post(register_proxy))
        .route("/auth/logout", post(logout_proxy))
        .route("/auth/refresh", post(refresh_proxy))
}

/// `POST /api/v1/auth/token` — legacy form-encoded login relay.
async fn token_proxy(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    forward(&state, "token", &headers, body).await
}

/// `POST /api/v1/auth/register`.
async fn register_proxy(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    forward(&state, "register", &headers, body).await
}

/// `POST /api/v1/auth/logout` — forwards the `Authorization` header.
async fn logout_proxy(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    forward(&state, "logout", &headers, body).await
}

/// `POST /api/v1/auth/refresh`.
async fn refresh_proxy(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    forward(&state, "refresh", &headers, body).await
}

async fn forward(state: &AppState, path: &str, headers: &HeaderMap, body: Bytes) -> Response {
    let url = format!(
        "{}/{}",
        state.config.upstream_auth_url.trim_end_matches('/'),
        path
    );

    let mut request = state.http.post(&url).body(body.to_vec());
    for name in FORWARDED_HEADERS {
        if let Some(value) = headers.get(name).and_then(|v| v.to_str().ok()) {
            request = request.header(name, value);
        }
    }

    tracing::debug!(url = %url, "Forwarding auth request upstream");

    match request.send().await {
        Ok(upstream) => relay(upstream).await,
        Err(e) => unavailable(e.to_string()),
    }
}

/// Relay the upstream status and body unchanged.
async fn relay(upstream: reqwest::Response) -> Response {
    let status = StatusCode::from_u16(upstream.status().as_u16())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let content_type = upstream
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    match upstream.bytes().await {
        Ok(bytes) => Response::builder()
            .status(status)
            .header(header::CONTENT_TYPE, content_type)
            .body(Body::from(bytes))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response()),
        Err(e) => unavailable(e.to_string()),
    }
}

/// The upstream-unreachable branch: generic 500 with `{error, details}`.
fn unavailable(details: String) -> Response {
    tracing::error!(details = %details, "Authentication service unreachable");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": "Authentication service is unavailable",
            "details": details,
        })),
    )
        .into_response()
}
