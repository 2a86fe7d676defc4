//! Audio recognition service client
//!
//! Uploads a downloaded audio file to the recognition service and parses
//! the match result. The response mirrors the Shazam result shape: a
//! `track` record with nested hub/actions/images, every level optional.
//! Absent fields degrade to `None`, never an error.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = "SongSnap/0.1.0 (+https://github.com/songsnap/songsnap)";
const RECOGNIZE_TIMEOUT: Duration = Duration::from_secs(30);

/// Recognition client errors
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Recognition lookup response
///
/// An empty object means the sample matched nothing.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RecognitionResponse {
    #[serde(default)]
    pub track: Option<Track>,
}

/// Matched track record
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Track {
    /// Track title
    #[serde(default)]
    pub title: Option<String>,
    /// Artist line
    #[serde(default)]
    pub subtitle: Option<String>,
    /// Cover art variants
    #[serde(default)]
    pub images: Option<TrackImages>,
    /// Provider hub (streaming platform actions)
    #[serde(default)]
    pub hub: Option<Hub>,
}

/// Cover art URLs
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackImages {
    #[serde(default)]
    pub coverart: Option<String>,
    /// High-quality variant, preferred for display
    #[serde(default)]
    pub coverarthq: Option<String>,
}

/// Provider hub: a list of options, each carrying platform actions
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Hub {
    #[serde(default)]
    pub options: Vec<HubOption>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HubOption {
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub actions: Vec<HubAction>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HubAction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub action_type: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

impl Track {
    /// High-quality cover art URL, if the match carried one
    pub fn cover_art(&self) -> Option<&str> {
        self.images.as_ref()?.coverarthq.as_deref()
    }

    /// Deep-link URI for the streaming platform
    ///
    /// The last action of the first hub option; the preceding actions are
    /// preview/intent entries.
    pub fn platform_uri(&self) -> Option<&str> {
        self.hub.as_ref()?.options.first()?.actions.last()?.uri.as_deref()
    }
}

/// Recognition service API client
pub struct RecognitionClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl RecognitionClient {
    pub fn new(base_url: String) -> Result<Self, RecognitionError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(RECOGNIZE_TIMEOUT)
            .build()
            .map_err(|e| RecognitionError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Identify the song in a local audio file
    ///
    /// Uploads the file and returns the structured match, or an empty
    /// result when the service found no track.
    pub async fn recognize(&self, audio_path: &Path) -> Result<RecognitionResponse, RecognitionError> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sample.mp3".to_string());

        tracing::debug!(
            file = %audio_path.display(),
            size_bytes = bytes.len(),
            "Submitting sample to recognition service"
        );

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name)
            .mime_str("audio/mpeg")
            .map_err(|e| RecognitionError::ParseError(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http_client
            .post(format!("{}/v1/recognize", self.base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| RecognitionError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(RecognitionError::ApiError(status.as_u16(), error_text));
        }

        let result: RecognitionResponse = response
            .json()
            .await
            .map_err(|e| RecognitionError::ParseError(e.to_string()))?;

        match &result.track {
            Some(track) => tracing::info!(
                title = track.title.as_deref().unwrap_or("<unknown>"),
                subtitle = track.subtitle.as_deref().unwrap_or("<unknown>"),
                "Recognition matched a track"
            ),
            None => tracing::info!(file = %audio_path.display(), "Recognition found no track"),
        }

        Ok(result)
    }
}
