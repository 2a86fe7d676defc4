//! Song identification endpoint
//!
//! POST /identify: download the audio behind a social-video URL, submit it
//! to the recognition service, and return track metadata plus streaming
//! platform links. The scratch file is removed on every exit path.

use axum::{extract::State, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::{
    error::ApiResult,
    services::Platform,
    AppState,
};

/// Sentinel body returned when the recognition service matched nothing
pub const TRACK_NOT_FOUND_MESSAGE: &str = "Musique non trouvée";

/// POST /identify request
#[derive(Debug, Deserialize)]
pub struct IdentifyRequest {
    pub url: String,
}

/// POST /identify response
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum IdentifyResponse {
    Match(TrackSummary),
    NoMatch(NoMatch),
}

/// Matched track metadata and platform links
#[derive(Debug, Serialize)]
pub struct TrackSummary {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    /// High-quality cover art URL
    pub image: Option<String>,
    /// Deep link reported by the recognition service
    pub apple_music: Option<String>,
    /// Synthesized search URL, always present on a match
    pub youtube_url: String,
    /// Synthesized search URL, always present on a match
    pub spotify_url: String,
}

/// "No track identified" body. Deliberately error-shaped but served with
/// HTTP 200: an unrecognized sample is a normal outcome, not a failure.
#[derive(Debug, Serialize)]
pub struct NoMatch {
    pub error: String,
}

/// POST /identify
pub async fn identify_song(
    State(state): State<AppState>,
    Json(request): Json<IdentifyRequest>,
) -> ApiResult<Json<IdentifyResponse>> {
    match run_identification(&state, &request).await {
        Ok(response) => Ok(Json(response)),
        Err(e) => {
            *state.last_error.write().await = Some(e.to_string());
            Err(e)
        }
    }
}

async fn run_identification(
    state: &AppState,
    request: &IdentifyRequest,
) -> ApiResult<IdentifyResponse> {
    tracing::info!(url = %request.url, "Identification request");

    let platform = Platform::from_url(&request.url);
    if let Some(delay) = platform.pre_download_delay() {
        tracing::debug!(url = %request.url, ?delay, "Pacing short-form platform request");
        tokio::time::sleep(delay).await;
    }

    // Per-request scratch name; concurrent requests never share a path
    let stem = state
        .work_dir
        .join(format!("temp_audio_{}", Uuid::new_v4()));

    let audio_path = state.downloader.download_audio(&request.url, &stem).await?;

    // The scratch file is gone before the result is inspected, on both the
    // success and the error path.
    let result = state.recognizer.recognize(&audio_path).await;
    remove_scratch_file(&audio_path).await;
    let response = result?;

    let Some(track) = response.track else {
        return Ok(IdentifyResponse::NoMatch(NoMatch {
            error: TRACK_NOT_FOUND_MESSAGE.to_string(),
        }));
    };

    let (youtube_url, spotify_url) = search_urls(track.subtitle.as_deref(), track.title.as_deref());

    Ok(IdentifyResponse::Match(TrackSummary {
        image: track.cover_art().map(str::to_string),
        apple_music: track.platform_uri().map(str::to_string),
        title: track.title,
        subtitle: track.subtitle,
        youtube_url,
        spotify_url,
    }))
}

/// Best-effort scratch file removal
async fn remove_scratch_file(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(file = %path.display(), error = %e, "Failed to remove scratch file");
    }
}

/// Derive search URLs for platforms the recognition service does not link
///
/// Plain interpolation of "<artist> <title>"; missing parts become empty
/// strings. The URLs are not verified to resolve.
fn search_urls(subtitle: Option<&str>, title: Option<&str>) -> (String, String) {
    let subtitle = subtitle.unwrap_or_default();
    let title = title.unwrap_or_default();

    (
        format!("https://www.youtube.com/results?search_query={subtitle}+{title}"),
        format!("https://open.spotify.com/search/{subtitle} {title}"),
    )
}

/// Build identification routes
pub fn identify_routes() -> Router<AppState> {
    Router::new().route("/identify", post(identify_song))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_urls_interpolate_artist_and_title() {
        let (youtube, spotify) = search_urls(Some("Justin Bieber"), Some("Sorry"));

        assert_eq!(
            youtube,
            "https://www.youtube.com/results?search_query=Justin Bieber+Sorry"
        );
        assert_eq!(spotify, "https://open.spotify.com/search/Justin Bieber Sorry");
    }

    #[test]
    fn search_urls_tolerate_missing_fields() {
        let (youtube, spotify) = search_urls(None, Some("Sorry"));

        assert_eq!(youtube, "https://www.youtube.com/results?search_query=+Sorry");
        assert_eq!(spotify, "https://open.spotify.com/search/ Sorry");
    }

    #[test]
    fn no_match_serializes_to_sentinel_body() {
        let response = IdentifyResponse::NoMatch(NoMatch {
            error: TRACK_NOT_FOUND_MESSAGE.to_string(),
        });

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value, serde_json::json!({"error": "Musique non trouvée"}));
    }

    #[test]
    fn match_serializes_flat_metadata_object() {
        let response = IdentifyResponse::Match(TrackSummary {
            title: Some("Sorry".to_string()),
            subtitle: Some("Justin Bieber".to_string()),
            image: None,
            apple_music: None,
            youtube_url: "https://www.youtube.com/results?search_query=a+b".to_string(),
            spotify_url: "https://open.spotify.com/search/a b".to_string(),
        });

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["title"], "Sorry");
        assert_eq!(value["subtitle"], "Justin Bieber");
        assert!(value["image"].is_null());
        assert!(value["apple_music"].is_null());
        assert!(value.get("error").is_none());
    }
}
