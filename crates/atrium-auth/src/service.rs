//! The auth service: login, logout, refresh, and startup initialization.
//!
//! The service computes new session states and hands them to the injected
//! [`SessionStore`]; it keeps no mutable state of its own beyond the
//! persisted copy.

use std::time::{SystemTime, UNIX_EPOCH};

use atrium_types::{
    AuthCode, AuthRejection, LoginRequest, RefreshRequest, SessionState, TokenResponse,
};
use url::Url;

use crate::error::{AuthError, Result};
use crate::session::SharedSessionStore;

/// Client-side authentication service.
#[derive(Debug, Clone)]
pub struct AuthService {
    http: reqwest::Client,
    base_url: Url,
    store: SharedSessionStore,
}

impl AuthService {
    /// Create a service bound to a base URL, persisting into `store`.
    pub fn new(base_url: impl AsRef<str>, store: SharedSessionStore) -> Result<Self> {
        let mut base_url = Url::parse(base_url.as_ref())
            .map_err(|e| AuthError::Config(format!("Invalid base URL: {}", e)))?;
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            store,
        })
    }

    /// The session store this service persists into.
    pub fn store(&self) -> &SharedSessionStore {
        &self.store
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| AuthError::Config(format!("Invalid endpoint path: {}", e)))
    }

    fn now_secs() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Log in with the given credentials.
    ///
    /// On success the new session state is persisted and returned. On a
    /// non-success response the upstream `{code, message}` body is surfaced
    /// unchanged as [`AuthError::Rejected`].
    pub async fn login(&self, credentials: &LoginRequest) -> Result<SessionState> {
        // Recorded before the network call so the guard's first-visit flag
        // covers failed attempts too.
        self.store.record_login_attempt().await?;

        let url = self.endpoint("auth/login")?;
        tracing::debug!(email = %credentials.email, "Attempting login");

        let response = self.http.post(url).json(credentials).send().await?;

        if !response.status().is_success() {
            let rejection = match response.json::<AuthRejection>().await {
                Ok(rejection) => rejection,
                Err(_) => AuthRejection::new(
                    AuthCode::InternalServerError,
                    "An unexpected error occurred",
                ),
            };
            tracing::warn!(code = %rejection.code, "Login rejected");
            return Err(AuthError::Rejected(rejection));
        }

        let tokens: TokenResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Serialization(format!("Invalid login response: {}", e)))?;

        let state = SessionState::from_tokens(tokens);
        self.store.save(&state).await?;
        tracing::info!("Login successful");
        Ok(state)
    }

    /// Log out.
    ///
    /// The persisted state is cleared unconditionally; the server-side
    /// logout endpoint is then notified best-effort. A failed notification
    /// never blocks the local logout.
    pub async fn logout(&self) -> Result<()> {
        let previous = self.store.load().await.unwrap_or_default();
        self.store.clear().await?;
        tracing::info!("Logged out, session state cleared");

        let url = self.endpoint("auth/logout")?;
        let mut request = self.http.post(url);
        if let Some(token) = previous.access_token {
            request = request.bearer_auth(token);
        }
        if let Err(e) = request.send().await {
            tracing::debug!(error = %e, "Server-side logout notification failed");
        }

        Ok(())
    }

    /// Refresh the access token using the stored refresh token.
    ///
    /// Returns `Ok(None)` when no refresh token is present. Any failure of
    /// the refresh call itself becomes [`AuthError::RefreshFailed`].
    pub async fn refresh_token(&self) -> Result<Option<SessionState>> {
        let current = self.store.load().await?;

        let Some(refresh_token) = current.refresh_token else {
            tracing::debug!("No refresh token present");
            return Ok(None);
        };

        let url = self.endpoint("auth/refresh")?;
        let response = self
            .http
            .post(url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Refresh request failed");
                AuthError::RefreshFailed
            })?;

        if !response.status().is_success() {
            tracing::warn!(status = response.status().as_u16(), "Token refresh failed");
            return Err(AuthError::RefreshFailed);
        }

        let tokens: TokenResponse = response.json().await.map_err(|_| AuthError::RefreshFailed)?;

        let state = SessionState::from_tokens(tokens);
        self.store.save(&state).await?;
        tracing::info!("Token refreshed");
        Ok(Some(state))
    }

    /// Initialize the session at application start.
    ///
    /// An authenticated, unexpired persisted state is returned as-is with
    /// no network call. Otherwise the refresh path is attempted when a
    /// refresh token exists; on failure the local state is cleared and
    /// `None` is returned.
    pub async fn initialize_token(&self) -> Result<Option<SessionState>> {
        let current = self.store.load().await?;

        if current.is_authenticated && !current.is_token_expired(Self::now_secs()) {
            tracing::debug!("Using existing valid session");
            return Ok(Some(current));
        }

        if current.refresh_token.is_none() {
            return Ok(None);
        }

        match self.refresh_token().await {
            Ok(state) => Ok(state),
            Err(e) => {
                tracing::warn!(error = %e, "Session initialization failed, clearing state");
                self.store.clear().await?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{InMemorySessionStore, SessionStore};
    use atrium_types::User;
    use std::sync::Arc;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_user() -> User {
        User {
            id: "1".to_string(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn token_body(access: &str, refresh: &str, expires_at: u64) -> serde_json::Value {
        serde_json::json!({
            "accessToken": access,
            "refreshToken": refresh,
            "user": {
                "id": "1",
                "username": "testuser",
                "email": "test@example.com",
                "createdAt": "2024-01-01T00:00:00Z"
            },
            "expiresAt": expires_at
        })
    }

    fn authenticated_state(expires_at: u64) -> SessionState {
        SessionState::from_tokens(TokenResponse {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            user: sample_user(),
            expires_at,
        })
    }

    fn now_secs() -> u64 {
        AuthService::now_secs()
    }

    #[tokio::test]
    async fn test_login_success_persists_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(token_body("a1", "r1", now_secs() + 3600)),
            )
            .mount(&server)
            .await;

        let store = Arc::new(InMemorySessionStore::new());
        let service = AuthService::new(server.uri(), store.clone()).unwrap();

        let state = service
            .login(&LoginRequest {
                email: "test@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();

        assert!(state.is_authenticated);
        assert_eq!(state.access_token.as_deref(), Some("a1"));
        assert_eq!(store.load().await.unwrap(), state);
        assert!(store.login_attempted().await);
    }

    #[tokio::test]
    async fn test_login_rejection_surfaces_code_and_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "INVALID_CREDENTIALS",
                "message": "Invalid email or password"
            })))
            .mount(&server)
            .await;

        let store = Arc::new(InMemorySessionStore::new());
        let service = AuthService::new(server.uri(), store.clone()).unwrap();

        let err = service
            .login(&LoginRequest {
                email: "nobody@example.com".to_string(),
                password: "x".to_string(),
            })
            .await
            .unwrap_err();

        let rejection = err.rejection().expect("expected a rejection");
        assert_eq!(rejection.code, AuthCode::InvalidCredentials);
        assert_eq!(rejection.message, "Invalid email or password");
        assert!(!store.load().await.unwrap().is_authenticated);
    }

    #[tokio::test]
    async fn test_login_unparseable_error_becomes_internal() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let store = Arc::new(InMemorySessionStore::new());
        let service = AuthService::new(server.uri(), store).unwrap();

        let err = service
            .login(&LoginRequest {
                email: "test@example.com".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(
            err.rejection().map(|r| r.code),
            Some(AuthCode::InternalServerError)
        );
    }

    #[tokio::test]
    async fn test_refresh_without_token_returns_none() {
        // No mock server at all: this path may not touch the network.
        let store = Arc::new(InMemorySessionStore::new());
        let service = AuthService::new("http://127.0.0.1:9", store).unwrap();

        let result = service.refresh_token().await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_refresh_success_rotates_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .and(body_partial_json(serde_json::json!({
                "refreshToken": "refresh"
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(token_body("a2", "r2", now_secs() + 3600)),
            )
            .mount(&server)
            .await;

        let store = Arc::new(InMemorySessionStore::with_state(authenticated_state(0)));
        let service = AuthService::new(server.uri(), store.clone()).unwrap();

        let state = service.refresh_token().await.unwrap().unwrap();
        assert_eq!(state.access_token.as_deref(), Some("a2"));
        assert_eq!(state.refresh_token.as_deref(), Some("r2"));
        assert_eq!(store.load().await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_refresh_failure_is_refresh_failed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "code": "UNAUTHORIZED",
                "message": "Invalid refresh token"
            })))
            .mount(&server)
            .await;

        let store = Arc::new(InMemorySessionStore::with_state(authenticated_state(0)));
        let service = AuthService::new(server.uri(), store).unwrap();

        let err = service.refresh_token().await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshFailed));
        assert_eq!(err.to_string(), "Token refresh failed");
    }

    #[tokio::test]
    async fn test_initialize_valid_state_makes_no_network_call() {
        // Unroutable base URL: any network attempt would error out.
        let store = Arc::new(InMemorySessionStore::with_state(authenticated_state(
            now_secs() + 3600,
        )));
        let service = AuthService::new("http://127.0.0.1:9", store).unwrap();

        let state = service.initialize_token().await.unwrap().unwrap();
        assert!(state.is_authenticated);
        assert_eq!(state.access_token.as_deref(), Some("access"));
    }

    #[tokio::test]
    async fn test_initialize_expired_state_refreshes() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(token_body("a3", "r3", now_secs() + 3600)),
            )
            .mount(&server)
            .await;

        let store = Arc::new(InMemorySessionStore::with_state(authenticated_state(0)));
        let service = AuthService::new(server.uri(), store).unwrap();

        let state = service.initialize_token().await.unwrap().unwrap();
        assert_eq!(state.access_token.as_deref(), Some("a3"));
    }

    #[tokio::test]
    async fn test_initialize_refresh_failure_clears_state() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let store = Arc::new(InMemorySessionStore::with_state(authenticated_state(0)));
        let service = AuthService::new(server.uri(), store.clone()).unwrap();

        let result = service.initialize_token().await.unwrap();
        assert!(result.is_none());
        assert!(!store.load().await.unwrap().is_authenticated);
    }

    #[tokio::test]
    async fn test_initialize_without_any_tokens_returns_none() {
        let store = Arc::new(InMemorySessionStore::new());
        let service = AuthService::new("http://127.0.0.1:9", store).unwrap();

        let result = service.initialize_token().await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_state_even_when_server_unreachable() {
        let store = Arc::new(InMemorySessionStore::with_state(authenticated_state(
            now_secs() + 3600,
        )));
        let service = AuthService::new("http://127.0.0.1:9", store.clone()).unwrap();

        service.logout().await.unwrap();
        assert!(!store.load().await.unwrap().is_authenticated);
    }
}
