//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::duration::Duration;

/// Default application name shown as notification title and sender
pub const DEFAULT_APP_NAME: &str = "smart-notify";

/// Name of the mailbox directory under the system temp dir
pub const MAILBOX_DIR_NAME: &str = "smart-notify-contexts";

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub app_name: Option<String>,
    pub freshness_window: Option<String>,
    pub retention_window: Option<String>,
    pub interaction_timeout: Option<String>,
    pub grace_period: Option<String>,
    pub command_timeout: Option<String>,
    pub mailbox_dir: Option<String>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            app_name: Some(DEFAULT_APP_NAME.to_string()),
            freshness_window: Some(Duration::default_freshness_window().to_string()),
            retention_window: Some(Duration::default_retention_window().to_string()),
            interaction_timeout: Some(Duration::default_interaction_timeout().to_string()),
            grace_period: Some(Duration::default_grace_period().to_string()),
            command_timeout: Some(Duration::default_command_timeout().to_string()),
            mailbox_dir: None,
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            app_name: other.app_name.or(self.app_name),
            freshness_window: other.freshness_window.or(self.freshness_window),
            retention_window: other.retention_window.or(self.retention_window),
            interaction_timeout: other.interaction_timeout.or(self.interaction_timeout),
            grace_period: other.grace_period.or(self.grace_period),
            command_timeout: other.command_timeout.or(self.command_timeout),
            mailbox_dir: other.mailbox_dir.or(self.mailbox_dir),
        }
    }

    fn parse_or(value: &Option<String>, fallback: fn() -> Duration) -> Duration {
        value
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(fallback)
    }

    /// Get app name, or the binary name if not set
    pub fn app_name_or_default(&self) -> &str {
        self.app_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(DEFAULT_APP_NAME)
    }

    /// Get freshness window, or default if not set/invalid
    pub fn freshness_window_or_default(&self) -> Duration {
        Self::parse_or(&self.freshness_window, Duration::default_freshness_window)
    }

    /// Get retention window, or default if not set/invalid
    pub fn retention_window_or_default(&self) -> Duration {
        Self::parse_or(&self.retention_window, Duration::default_retention_window)
    }

    /// Get interaction timeout, or default if not set/invalid
    pub fn interaction_timeout_or_default(&self) -> Duration {
        Self::parse_or(
            &self.interaction_timeout,
            Duration::default_interaction_timeout,
        )
    }

    /// Get grace period, or default if not set/invalid
    pub fn grace_period_or_default(&self) -> Duration {
        Self::parse_or(&self.grace_period, Duration::default_grace_period)
    }

    /// Get command timeout, or default if not set/invalid
    pub fn command_timeout_or_default(&self) -> Duration {
        Self::parse_or(&self.command_timeout, Duration::default_command_timeout)
    }

    /// Get mailbox directory, or `$TMPDIR/smart-notify-contexts` if not set
    pub fn mailbox_dir_or_default(&self) -> PathBuf {
        self.mailbox_dir
            .as_deref()
            .filter(|dir| !dir.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(MAILBOX_DIR_NAME))
    }
}
