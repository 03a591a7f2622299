//! Reactive holder of the current session state.
//!
//! Views read the current state from here; all mutation goes through the
//! wrapped [`AuthService`]. The store owns the in-memory copy exclusively
//! and replaces it wholesale after each completed operation — there is no
//! intermediate "loading" state.

use std::sync::Arc;

use atrium_types::{LoginRequest, SessionState, User};
use parking_lot::RwLock;

use crate::error::Result;
use crate::service::AuthService;

/// Thread-safe session state holder wrapping the auth service.
#[derive(Debug)]
pub struct AuthStore {
    service: Arc<AuthService>,
    state: RwLock<SessionState>,
}

impl AuthStore {
    /// Create a store around a service, starting logged out.
    pub fn new(service: Arc<AuthService>) -> Self {
        Self {
            service,
            state: RwLock::new(SessionState::unauthenticated()),
        }
    }

    /// Snapshot of the current state.
    pub fn snapshot(&self) -> SessionState {
        self.state.read().clone()
    }

    /// Derived read of the authentication flag.
    pub fn is_authenticated(&self) -> bool {
        self.state.read().is_authenticated
    }

    /// The current user, if any.
    pub fn user(&self) -> Option<User> {
        self.state.read().user.clone()
    }

    fn reset(&self) {
        *self.state.write() = SessionState::unauthenticated();
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actions
    // ─────────────────────────────────────────────────────────────────────────

    /// Log in. On failure the state is reset to unauthenticated and the
    /// error is re-raised to the caller.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<SessionState> {
        match self.service.login(credentials).await {
            Ok(state) => {
                *self.state.write() = state.clone();
                Ok(state)
            }
            Err(e) => {
                tracing::error!(error = %e, "Login failed");
                self.reset();
                Err(e)
            }
        }
    }

    /// Log out: persisted and in-memory state are cleared together.
    pub async fn logout(&self) {
        if let Err(e) = self.service.logout().await {
            tracing::warn!(error = %e, "Logout cleanup failed");
        }
        self.reset();
    }

    /// Refresh the access token. A null or failed result forces a
    /// logout-equivalent reset.
    pub async fn refresh_token(&self) -> Option<SessionState> {
        match self.service.refresh_token().await {
            Ok(Some(state)) => {
                *self.state.write() = state.clone();
                Some(state)
            }
            Ok(None) => {
                tracing::warn!("No refresh token available, logging out");
                self.logout().await;
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "Token refresh failed, logging out");
                self.logout().await;
                None
            }
        }
    }

    /// Initialize the state at application start.
    pub async fn initialize_auth_state(&self) {
        match self.service.initialize_token().await {
            Ok(Some(state)) => *self.state.write() = state,
            Ok(None) => self.reset(),
            Err(e) => {
                tracing::error!(error = %e, "Auth state initialization failed");
                self.reset();
            }
        }
    }
}
