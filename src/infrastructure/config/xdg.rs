//! XDG config store adapter
//!
//! TOML file at `$XDG_CONFIG_HOME/smart-notify/config.toml`.

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

const APP_DIR: &str = "smart-notify";
const CONFIG_FILE: &str = "config.toml";

/// XDG-compliant config store
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    /// Store at the platform config directory
    pub fn new() -> Self {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(std::env::temp_dir);

        Self {
            path: base.join(APP_DIR).join(CONFIG_FILE),
        }
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse TOML content into AppConfig
    fn parse_toml(content: &str) -> Result<AppConfig, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Serialize AppConfig to TOML
    fn to_toml(config: &AppConfig) -> Result<String, ConfigError> {
        toml::to_string_pretty(config)
            .map_err(|e| ConfigError::WriteError(e.to_string()))
    }
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AppConfig::empty()),
            Err(e) => {
                return Err(ConfigError::ReadError(format!(
                    "{}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        Self::parse_toml(&content)
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let write_err = |e: std::io::Error| ConfigError::WriteError(e.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        // Readers never see a half-written file
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, Self::to_toml(config)?).await.map_err(write_err)?;
        fs::rename(&tmp, &self.path).await.map_err(write_err)
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.is_file()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyExists(
                self.path.display().to_string(),
            ));
        }

        self.save(&AppConfig::defaults()).await
    }
}
