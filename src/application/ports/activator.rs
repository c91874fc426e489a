//! Application activator port interface

use async_trait::async_trait;
use thiserror::Error;

/// Application activation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActivationError {
    #[error("Invalid application identifier: '{0}'")]
    InvalidIdentifier(String),

    #[error("Application not found: {0}")]
    ApplicationNotFound(String),

    #[error("Failed to activate application: {0}")]
    ActivationFailed(String),
}

/// Port for bringing another application to the foreground
#[async_trait]
pub trait AppActivator: Send + Sync {
    /// Activate an application by bundle/desktop identifier or name.
    ///
    /// # Arguments
    /// * `target` - e.g. `com.apple.Safari`, `org.mozilla.firefox` or `Firefox`
    ///
    /// # Returns
    /// true when an application was activated
    async fn activate(&self, target: &str) -> Result<bool, ActivationError>;
}
