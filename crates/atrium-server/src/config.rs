//! Server configuration.

use std::net::SocketAddr;

/// Default upstream authentication service, matching the docker-compose
/// service name used in development.
pub const DEFAULT_UPSTREAM_AUTH_URL: &str = "http://auth-service:8000";

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the server to.
    pub bind_address: SocketAddr,

    /// Base URL of the external authentication service that the proxy
    /// routes forward to.
    pub upstream_auth_url: String,

    /// Secret used to sign and verify locally issued tokens.
    pub jwt_secret: String,

    /// Enable request logging.
    pub request_logging: bool,

    /// Enable permissive CORS (development mode).
    pub cors_enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".parse().expect("valid default address"),
            upstream_auth_url: DEFAULT_UPSTREAM_AUTH_URL.to_string(),
            jwt_secret: "dev-secret-change-me".to_string(),
            request_logging: true,
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Set the bind address.
    pub fn with_bind_address(mut self, addr: SocketAddr) -> Self {
        self.bind_address = addr;
        self
    }

    /// Set the upstream auth-service base URL.
    pub fn with_upstream_auth_url(mut self, url: impl Into<String>) -> Self {
        self.upstream_auth_url = url.into();
        self
    }

    /// Set the JWT signing secret.
    pub fn with_jwt_secret(mut self, secret: impl Into<String>) -> Self {
        self.jwt_secret = secret.into();
        self
    }

    /// Enable or disable request logging.
    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.request_logging = enabled;
        self
    }

    /// Enable or disable CORS.
    pub fn with_cors(mut self, enabled: bool) -> Self {
        self.cors_enabled = enabled;
        self
    }
}
