//! HTTP API client for the Atrium server.
//!
//! Wraps `reqwest` with the two behaviors every Atrium request needs:
//!
//! - **Bearer attachment**: when the session store holds an access token,
//!   it is attached as `Authorization: Bearer <token>`.
//! - **Refresh-and-retry**: a 401 response triggers one token refresh and
//!   one resend of the original request. A second 401 propagates as an
//!   error; a failed refresh logs the session out.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use atrium_auth::{AuthService, create_session_store};
//! use atrium_client::ApiClient;
//!
//! # async fn example() -> atrium_client::Result<()> {
//! let store = create_session_store(std::path::Path::new("/var/lib/atrium"));
//! let auth = Arc::new(AuthService::new("http://localhost:8080", store)?);
//!
//! let client = ApiClient::builder()
//!     .base_url("http://localhost:8080")
//!     .auth(auth)
//!     .build()?;
//!
//! let profile: serde_json::Value = client.get("users/me").await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;

pub use client::{ApiClient, ClientBuilder};
pub use error::{Error, Result};
