//! songsnap-id - Song Identification service
//!
//! Accepts a social-video URL, downloads its audio track through the media
//! downloader, identifies the song via the recognition service, and
//! returns metadata plus streaming-platform links.

pub mod api;
pub mod config;
pub mod error;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::services::{AudioDownloader, RecognitionClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Media downloader client
    pub downloader: Arc<AudioDownloader>,
    /// Audio recognition client
    pub recognizer: Arc<RecognitionClient>,
    /// Directory for per-request scratch audio files
    pub work_dir: PathBuf,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        downloader: AudioDownloader,
        recognizer: RecognitionClient,
        work_dir: PathBuf,
    ) -> Self {
        Self {
            downloader: Arc::new(downloader),
            recognizer: Arc::new(recognizer),
            work_dir,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::identify_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        // Browser frontends call from arbitrary origins. Restrict before
        // exposing this service publicly.
        .layer(CorsLayer::permissive())
        .with_state(state)
}
