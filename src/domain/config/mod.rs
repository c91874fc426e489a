//! Configuration domain types

mod app_config;

pub use app_config::{AppConfig, DEFAULT_APP_NAME, MAILBOX_DIR_NAME};
