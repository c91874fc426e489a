//! URL opener port interface

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// URL opener errors
#[derive(Debug, Clone, Error)]
pub enum OpenError {
    #[error("No URL handler available: {0}")]
    HandlerNotFound(String),

    #[error("Failed to open URL: {0}")]
    OpenFailed(String),
}

/// Port for handing URLs to the system handler
#[async_trait]
pub trait UrlOpener: Send + Sync {
    /// Open a URL with the system's default handler.
    ///
    /// # Arguments
    /// * `url` - A parsed, absolute URL
    async fn open(&self, url: &Url) -> Result<(), OpenError>;
}
