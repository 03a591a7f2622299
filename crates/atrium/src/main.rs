//! Atrium server binary.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use atrium_server::{Server, ServerConfig};

#[derive(Parser)]
#[command(name = "atrium", version, about = "Atrium application server")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "ATRIUM_HOST", default_value = "127.0.0.1")]
    host: IpAddr,

    /// Port to listen on
    #[arg(long, env = "ATRIUM_PORT", default_value_t = 8080)]
    port: u16,

    /// Base URL of the external authentication service
    #[arg(
        long,
        env = "ATRIUM_AUTH_SERVICE_URL",
        default_value = "http://auth-service:8000"
    )]
    auth_service_url: String,

    /// Secret for signing locally issued tokens
    #[arg(long, env = "ATRIUM_JWT_SECRET", default_value = "dev-secret-change-me")]
    jwt_secret: String,

    /// Directory for rotating JSON log files
    #[arg(long, env = "ATRIUM_LOG_DIR", default_value = "logs")]
    log_dir: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing — console (human-readable) + rotating JSON file
    let filter = if cli.verbose {
        "atrium=debug,atrium_server=debug,atrium_auth=debug,atrium_client=debug,info"
    } else {
        "atrium=info,atrium_server=info,atrium_auth=info,atrium_client=info,warn"
    };

    let file_appender = tracing_appender::rolling::daily(&cli.log_dir, "atrium.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "atrium=trace,atrium_server=trace,atrium_auth=trace,atrium_client=trace,info",
                )),
        )
        .init();

    let config = ServerConfig::default()
        .with_bind_address(SocketAddr::new(cli.host, cli.port))
        .with_upstream_auth_url(cli.auth_service_url)
        .with_jwt_secret(cli.jwt_secret);

    tracing::info!(
        upstream = %config.upstream_auth_url,
        "Atrium starting"
    );

    let server = Server::new(config)?;
    server.run().await?;
    Ok(())
}
