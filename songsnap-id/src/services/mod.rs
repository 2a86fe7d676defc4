//! External collaborator clients for the identification pipeline

pub mod downloader;
pub mod recognition;

pub use downloader::{AudioDownloader, DownloadError, Platform};
pub use recognition::{RecognitionClient, RecognitionError, RecognitionResponse, Track};
