//! songsnap-id - Song Identification service
//!
//! Single-endpoint HTTP service: POST /identify takes a social-video URL
//! and answers with the identified track's metadata and platform links.

use anyhow::Result;
use songsnap_common::config::TomlConfig;
use songsnap_id::config::ServiceConfig;
use songsnap_id::services::{AudioDownloader, RecognitionClient};
use songsnap_id::AppState;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Config file first: its logging level seeds the subscriber when
    // RUST_LOG is not set.
    let toml_config = TomlConfig::load();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&toml_config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting songsnap-id (Song Identification) service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = ServiceConfig::resolve(&toml_config);

    // Surface a missing downloader at startup instead of on first request
    if !AudioDownloader::is_available(&config.downloader_path) {
        warn!(
            "Downloader binary '{}' not runnable; downloads will fail until it is installed",
            config.downloader_path
        );
    }

    std::fs::create_dir_all(&config.work_dir)?;
    info!("Work directory: {}", config.work_dir.display());
    info!("Recognition service: {}", config.recognizer_url);

    let downloader = AudioDownloader::new(config.downloader_path.clone());
    let recognizer = RecognitionClient::new(config.recognizer_url.clone())?;
    let state = AppState::new(downloader, recognizer, config.work_dir.clone());

    let app = songsnap_id::build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
