//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod proxy;

pub use auth::auth_routes;
pub use health::health_routes;
pub use proxy::proxy_routes;
