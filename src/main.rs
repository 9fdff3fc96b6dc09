//! geolocate-ip - IP geolocation check service
//!
//! This is the composition root that wires together all the components.

use clap::{Parser, Subcommand};
use geolocate_ip::config::{load_config, load_env_file};
use geolocate_ip::infrastructure::shutdown_signal;
use geolocate_ip::{
    ApiServer, BasicAuth, DashMapResolutionCache, GeoLiteClient, LocationService,
    ShutdownController,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[derive(Parser)]
#[command(name = "geolocate-ip", version, about = "geolocate-ip demo app")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Dotenv file read before the environment (missing file is ignored)
        #[arg(long, default_value = "geolocate-ip.env")]
        env_file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve { env_file } => serve(env_file).await,
    }
}

async fn serve(env_file: PathBuf) -> anyhow::Result<()> {
    let env_file_loaded = load_env_file(&env_file)?;

    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting geolocate-ip listen={} test_mode={} env_file_loaded={}",
        cfg.listen_addr,
        cfg.test_mode,
        env_file_loaded
    );
    tracing::debug!(config = ?cfg, "configuration loaded");

    // ===== COMPOSITION ROOT =====

    // 1. Outbound adapters
    let lookup = Arc::new(GeoLiteClient::new(cfg.geolite())?);
    let cache = Arc::new(DashMapResolutionCache::with_max_entries(cfg.cache_max_entries));

    // 2. Application service
    let service = Arc::new(LocationService::new(lookup, cache));

    // 3. Inbound adapter
    let auth = if cfg.test_mode {
        tracing::warn!("test environment: basic auth is bypassed");
        BasicAuth::bypass()
    } else {
        BasicAuth::new(cfg.auth_username.clone(), cfg.auth_password.clone())
    };

    let controller = ShutdownController::new();
    tokio::spawn(shutdown_signal(controller.clone()));

    let server = ApiServer::new(cfg.listen_addr.clone(), service, auth)
        .request_timeout(Duration::from_secs(cfg.request_timeout_secs))
        .shutdown(controller, Duration::from_secs(cfg.shutdown_grace_secs));

    server.run().await
}
