//! Domain error types

use thiserror::Error;

/// Error when parsing a duration string
#[derive(Debug, Clone, Error)]
#[error("Invalid duration format: \"{input}\". Expected format: <number>ms, <number>s, <number>m, or <number>m<number>s (e.g., 500ms, 30s, 5m, 2m30s)")]
pub struct DurationParseError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

/// Error when a sound name cannot be resolved
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SoundError {
    #[error("Invalid sound: '{name}'. Use 'default' or a valid system sound name. Available sounds include: {suggestions}...")]
    InvalidSound { name: String, suggestions: String },
}

/// Invalid user input on the send/list/remove paths.
///
/// Always fatal to the current invocation (usage exit code).
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error("No message provided. Use -m/--message or pipe content via stdin.")]
    MissingMessage,

    #[error(transparent)]
    InvalidSound(#[from] SoundError),

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    InvalidAction(#[from] InvalidActionError),

    #[error("Invalid image '{path}': {reason}")]
    InvalidImage { path: String, reason: String },

    #[error("Must specify --group or --all")]
    MissingRemoveTarget,
}

/// Error when a click action carries an unusable value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {kind} action: {reason}")]
pub struct InvalidActionError {
    pub kind: &'static str,
    pub reason: String,
}
