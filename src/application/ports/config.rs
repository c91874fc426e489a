//! Configuration port
//!
//! The config file holds the app name, the mailbox location and the timing
//! windows (freshness, retention, interaction, grace, command timeout).

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Persistent user settings, merged under env and CLI overrides
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the stored settings. Keys absent from the file stay `None` so the
    /// merge can fall through to defaults; a missing file is an empty config.
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Replace the stored settings
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Location of the settings file
    fn path(&self) -> PathBuf;

    fn exists(&self) -> bool;

    /// Write the default windows and app name.
    ///
    /// # Errors
    /// `ConfigError::AlreadyExists` when a file is already present
    async fn init(&self) -> Result<(), ConfigError>;
}
