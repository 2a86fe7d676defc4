//! Error types for songsnap-id
//!
//! Maps every failure of the identification pipeline onto the HTTP surface:
//! a download that produced no file is the caller's problem (400, with the
//! user-facing French message), everything else is ours (500, carrying the
//! underlying error text).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::{DownloadError, RecognitionError};

/// User-facing message when the source platform (likely) blocked the download
pub const DOWNLOAD_BLOCKED_MESSAGE: &str =
    "Échec du téléchargement. TikTok bloque peut-être la requête.";

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),

    /// Media download error
    #[error("Download error: {0}")]
    Download(#[from] DownloadError),

    /// Audio recognition error
    #[error("Recognition error: {0}")]
    Recognition(#[from] RecognitionError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg),
            // The downloader ran but left no audio file behind: the source
            // platform most likely refused the request.
            ApiError::Download(DownloadError::OutputMissing { .. }) => (
                StatusCode::BAD_REQUEST,
                "DOWNLOAD_BLOCKED",
                DOWNLOAD_BLOCKED_MESSAGE.to_string(),
            ),
            ApiError::Download(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DOWNLOAD_ERROR",
                err.to_string(),
            ),
            ApiError::Recognition(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "RECOGNITION_ERROR",
                err.to_string(),
            ),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "IO_ERROR",
                err.to_string(),
            ),
            ApiError::Other(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                err.to_string(),
            ),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::DownloadError;
    use std::path::PathBuf;

    #[test]
    fn missing_output_maps_to_bad_request() {
        let err = ApiError::from(DownloadError::OutputMissing {
            stem: PathBuf::from("/tmp/temp_audio_x"),
        });
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn launch_failure_maps_to_internal_error() {
        let err = ApiError::from(DownloadError::ExecutionError("spawn failed".to_string()));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
