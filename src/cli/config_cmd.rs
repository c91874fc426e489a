//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::duration::Duration;
use crate::domain::error::ConfigError;

use super::args::{is_valid_config_key, ConfigAction, DURATION_CONFIG_KEYS, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

fn check_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        return Ok(());
    }
    Err(ConfigError::ValidationError {
        key: key.to_string(),
        message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
    })
}

/// Mutable slot for a config key
fn field_mut<'a>(config: &'a mut AppConfig, key: &str) -> Option<&'a mut Option<String>> {
    match key {
        "app_name" => Some(&mut config.app_name),
        "freshness_window" => Some(&mut config.freshness_window),
        "retention_window" => Some(&mut config.retention_window),
        "interaction_timeout" => Some(&mut config.interaction_timeout),
        "grace_period" => Some(&mut config.grace_period),
        "command_timeout" => Some(&mut config.command_timeout),
        "mailbox_dir" => Some(&mut config.mailbox_dir),
        _ => None,
    }
}

/// Current value of a config key
fn field(config: &AppConfig, key: &str) -> Option<String> {
    let mut copy = config.clone();
    field_mut(&mut copy, key).and_then(|slot| slot.take())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;
    validate_config_value(key, value)?;

    let mut config = store.load().await?;
    if let Some(slot) = field_mut(&mut config, key) {
        *slot = Some(value.trim().to_string());
    }

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value.trim()));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    check_key(key)?;

    let config = store.load().await?;
    match field(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        presenter.key_value(key, field(&config, key).as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

/// Validate a config value based on key type
fn validate_config_value(key: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| ConfigError::ValidationError {
        key: key.to_string(),
        message,
    };

    if value.trim().is_empty() {
        return Err(invalid("Value cannot be empty".to_string()));
    }

    if DURATION_CONFIG_KEYS.contains(&key) {
        value
            .trim()
            .parse::<Duration>()
            .map_err(|e| invalid(e.to_string()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::XdgConfigStore;
    use tempfile::TempDir;

    #[test]
    fn validate_durations() {
        assert!(validate_config_value("grace_period", "500ms").is_ok());
        assert!(validate_config_value("freshness_window", "1m").is_ok());
        assert!(validate_config_value("command_timeout", "2m30s").is_ok());
        assert!(validate_config_value("interaction_timeout", "soon").is_err());
        assert!(validate_config_value("retention_window", "0s").is_err());
    }

    #[test]
    fn validate_free_text() {
        assert!(validate_config_value("app_name", "Builds").is_ok());
        assert!(validate_config_value("mailbox_dir", "/var/tmp/x").is_ok());
        assert!(validate_config_value("app_name", "  ").is_err());
    }

    #[test]
    fn field_reads_each_key() {
        let config = AppConfig::defaults();
        assert_eq!(field(&config, "grace_period").as_deref(), Some("500ms"));
        assert_eq!(field(&config, "mailbox_dir"), None);
        assert_eq!(field(&config, "bogus"), None);
    }

    #[tokio::test]
    async fn set_then_get_round_trips_through_store() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let presenter = Presenter::new();

        handle_set(&store, &presenter, "interaction_timeout", "5s")
            .await
            .unwrap();
        let config = store.load().await.unwrap();
        assert_eq!(config.interaction_timeout.as_deref(), Some("5s"));
    }

    #[tokio::test]
    async fn unknown_key_is_rejected() {
        let dir = TempDir::new().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        let result = handle_set(&store, &Presenter::new(), "api_key", "x").await;
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
        assert!(!store.exists());
    }
}
