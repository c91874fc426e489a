//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, signal forwarding,
//! logging setup and the command handlers.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod list_cmd;
pub mod logging;
pub mod presenter;
pub mod relaunch;
pub mod send_cmd;
pub mod signals;

// Re-export commonly used types
pub use app::{load_merged_config, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, ListArgs, RemoveArgs, SendArgs};
pub use presenter::Presenter;
