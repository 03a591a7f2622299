//! Shared types for the Atrium application.
//!
//! These mirror the JSON wire format used between the UI, the Atrium
//! server, and the external authentication service. All field names are
//! camelCase on the wire.

pub mod auth;

pub use auth::{
    AuthCode, AuthRejection, LoginRequest, RefreshRequest, RegisterRequest, SessionState,
    TokenResponse, User,
};
