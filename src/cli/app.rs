//! Shared wiring for the command handlers

use std::env;
use std::path::PathBuf;

use tracing::warn;

use crate::application::ports::ConfigStore;
use crate::application::{LifecycleConfig, LifecycleController};
use crate::domain::config::AppConfig;
use crate::infrastructure::{
    FsMailbox, ShellExecutor, SystemActivator, SystemUrlOpener, XdgConfigStore,
};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment override for the mailbox directory
pub const MAILBOX_DIR_ENV: &str = "SMART_NOTIFY_MAILBOX_DIR";

/// Controller wired to the system adapters
pub type SystemController =
    LifecycleController<ShellExecutor, SystemUrlOpener<ShellExecutor>, SystemActivator>;

/// Configuration taken from the environment
pub fn env_config() -> AppConfig {
    AppConfig {
        mailbox_dir: env::var(MAILBOX_DIR_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|e| {
        warn!(error = %e, "Ignoring unreadable config file");
        AppConfig::empty()
    });

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config())
        .merge(cli_config)
}

/// Mailbox at the configured location with the configured windows
pub fn build_mailbox(config: &AppConfig) -> FsMailbox {
    let dir: PathBuf = config.mailbox_dir_or_default();
    FsMailbox::new(dir).with_windows(
        config.freshness_window_or_default().as_std(),
        config.retention_window_or_default().as_std(),
    )
}

/// Controller timing from configuration
pub fn lifecycle_config(config: &AppConfig) -> LifecycleConfig {
    LifecycleConfig {
        grace_period: config.grace_period_or_default().as_std(),
        command_timeout: config.command_timeout_or_default().as_std(),
    }
}

/// Lifecycle controller backed by the shell, the system opener and activator
pub fn system_controller(config: &AppConfig) -> SystemController {
    let executor = ShellExecutor::with_timeout(config.command_timeout_or_default().as_std());
    LifecycleController::new(
        executor.clone(),
        SystemUrlOpener::new(executor),
        SystemActivator::new(),
        lifecycle_config(config),
    )
}
