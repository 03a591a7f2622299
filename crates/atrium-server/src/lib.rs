//! HTTP server for Atrium.
//!
//! Serves two groups of routes:
//!
//! - **Local auth routes** (`/auth/*`): token issuance against the
//!   in-memory user directory.
//! - **Proxy routes** (`/api/v1/auth/*`): stateless relays to the external
//!   authentication service.
//!
//! # Example
//!
//! ```ignore
//! use atrium_server::{Server, ServerConfig};
//!
//! let config = ServerConfig::default()
//!     .with_bind_address("127.0.0.1:8080".parse()?)
//!     .with_upstream_auth_url("http://auth-service:8000");
//!
//! let server = Server::new(config)?;
//! server.run().await?;
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
pub mod token;

pub use config::ServerConfig;
pub use error::{Result, ServerError};
pub use state::AppState;

use std::net::SocketAddr;

use axum::{Router, middleware};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// The Atrium HTTP server.
pub struct Server {
    state: AppState,
}

impl Server {
    /// Create a new server from configuration.
    pub fn new(config: ServerConfig) -> Result<Self> {
        Ok(Self {
            state: AppState::new(config)?,
        })
    }

    /// Create a server from a pre-built application state.
    pub fn from_state(state: AppState) -> Self {
        Self { state }
    }

    /// Build the router with all routes and middleware.
    pub fn router(&self) -> Router {
        let mut router = Router::new()
            .merge(routes::health_routes())
            .merge(routes::auth_routes())
            .nest("/api/v1", routes::proxy_routes())
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                logging::request_logging_middleware,
            ))
            .layer(TraceLayer::new_for_http());

        if self.state.config.cors_enabled {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        router.with_state(self.state.clone())
    }

    /// Run the server.
    pub async fn run(self) -> std::io::Result<()> {
        let listener = TcpListener::bind(self.state.config.bind_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "Starting Atrium server");
        axum::serve(listener, self.router()).await
    }

    /// Run with graceful shutdown, returning the bound address.
    pub async fn run_with_shutdown(
        self,
        shutdown: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<SocketAddr> {
        let listener = TcpListener::bind(self.state.config.bind_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(addr = %local_addr, "Starting Atrium server");
        tokio::spawn(async move {
            axum::serve(listener, self.router())
                .with_graceful_shutdown(shutdown)
                .await
                .ok();
        });
        Ok(local_addr)
    }
}
