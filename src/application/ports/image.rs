//! Notification image resolver port interface

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Image resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    #[error("Image file not found: {0}")]
    NotFound(String),

    #[error("Image path is a directory: {0}")]
    IsDirectory(String),

    #[error("Unsupported image format '{extension}' for {path}")]
    UnsupportedFormat { path: String, extension: String },

    #[error("Failed to download image: {0}")]
    DownloadFailed(String),
}

impl ImageError {
    /// Remote failures are transient; local ones are input errors
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::DownloadFailed(_))
    }
}

/// Port for turning an image reference into a local file
#[async_trait]
pub trait ImageResolver: Send + Sync {
    /// Resolve an image reference.
    ///
    /// # Arguments
    /// * `reference` - `http(s)://` URL, `file://` URL or filesystem path
    ///
    /// # Returns
    /// Path of a readable local image file
    async fn resolve(&self, reference: &str) -> Result<PathBuf, ImageError>;
}
