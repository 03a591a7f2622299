//! Navigation guard.
//!
//! A single reusable check, parameterized by the route's declared auth
//! requirement. The gate is presence-only: it looks for a stored access
//! token and never judges validity or expiry, which is enforced
//! server-side on each request.

use crate::session::SessionStore;

/// Route name of the login view.
pub const LOGIN_ROUTE: &str = "login";
/// Route name of the registration view.
pub const REGISTER_ROUTE: &str = "register";
/// Route name of the dashboard, the default authenticated landing view.
pub const DASHBOARD_ROUTE: &str = "dashboard";

/// A navigable route and its declared auth requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteSpec {
    pub name: String,
    pub requires_auth: bool,
}

impl RouteSpec {
    pub fn new(name: impl Into<String>, requires_auth: bool) -> Self {
        Self {
            name: name.into(),
            requires_auth,
        }
    }

    /// A route anyone may visit.
    pub fn public(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// A route requiring authentication.
    pub fn protected(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }
}

/// Result of evaluating a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardOutcome {
    /// Proceed to the requested route.
    Allow,
    /// Send the visitor to the login view. `first_visit` is true when no
    /// login attempt has ever been recorded on this client.
    RedirectToLogin { first_visit: bool },
    /// Already holding a token; going back to login/register would only
    /// re-authenticate, so land on the dashboard instead.
    RedirectToDashboard,
}

/// Evaluate a navigation against the stored session.
pub async fn evaluate_navigation(store: &dyn SessionStore, route: &RouteSpec) -> GuardOutcome {
    let has_token = store
        .load()
        .await
        .map(|state| state.has_access_token())
        .unwrap_or(false);

    if has_token && (route.name == LOGIN_ROUTE || route.name == REGISTER_ROUTE) {
        tracing::debug!(route = %route.name, "Already authenticated, redirecting to dashboard");
        return GuardOutcome::RedirectToDashboard;
    }

    if route.requires_auth && !has_token {
        let first_visit = !store.login_attempted().await;
        tracing::debug!(route = %route.name, first_visit, "No token, redirecting to login");
        return GuardOutcome::RedirectToLogin { first_visit };
    }

    GuardOutcome::Allow
}
