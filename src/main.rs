//! Dashproxy - Main entry point
//!
//! Serves the dashboard directory and proxies whitelisted API calls

use anyhow::Result;
use clap::Parser;
use dashproxy::config::{DEFAULT_PORT, ServerConfig};
use dashproxy::DevServer;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Dashproxy - static dashboard server with a whitelisted CORS proxy
#[derive(Parser, Debug)]
#[command(name = "dashproxy")]
#[command(version)]
#[command(about = "Serve a dashboard directory and proxy whitelisted JSON APIs")]
struct Args {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Directory to serve static files from
    #[arg(long, env = "STATIC_ROOT", default_value = ".")]
    root: PathBuf,

    /// Log level or filter directives (e.g. `debug`, `dashproxy=trace,warn`)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

/// Build the log filter; unparseable directives fall back to `info`
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    FmtSubscriber::builder()
        .with_env_filter(log_filter(&args.log_level))
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting dashproxy v{}", env!("CARGO_PKG_VERSION"));

    let mut config = ServerConfig::default().with_static_root(&args.root)?;
    config.port = args.port;

    if !config.static_root.is_dir() {
        warn!("Static root {} is not a directory, every file will be 404", config.static_root.display());
    }

    let server = Arc::new(DevServer::new(Arc::new(config))?);

    server
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("dashproxy stopped");

    Ok(())
}
