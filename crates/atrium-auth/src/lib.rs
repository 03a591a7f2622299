//! Client-side authentication flow for Atrium.
//!
//! This crate holds everything between the UI and the auth endpoints:
//!
//! - [`SessionStore`]: the persisted session record, behind an explicit
//!   load/save/clear repository interface.
//! - [`AuthService`]: login, logout, token refresh, and startup
//!   initialization.
//! - [`AuthStore`]: the reactive state holder consumed by views.
//! - [`evaluate_navigation`]: the route guard.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use atrium_auth::{AuthService, AuthStore, create_session_store};
//! use atrium_types::LoginRequest;
//!
//! # async fn example() -> atrium_auth::Result<()> {
//! let store = create_session_store(std::path::Path::new("/var/lib/atrium"));
//! let service = Arc::new(AuthService::new("http://localhost:8080", store)?);
//! let auth = AuthStore::new(service);
//!
//! auth.initialize_auth_state().await;
//! if !auth.is_authenticated() {
//!     auth.login(&LoginRequest {
//!         email: "test@example.com".into(),
//!         password: "password123".into(),
//!     })
//!     .await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod guard;
pub mod service;
pub mod session;
pub mod store;

pub use error::{AuthError, Result};
pub use guard::{
    DASHBOARD_ROUTE, GuardOutcome, LOGIN_ROUTE, REGISTER_ROUTE, RouteSpec, evaluate_navigation,
};
pub use service::AuthService;
pub use session::{
    FileSessionStore, InMemorySessionStore, SESSION_FILE, SessionStore, SharedSessionStore,
    create_memory_session_store, create_session_store,
};
pub use store::AuthStore;
