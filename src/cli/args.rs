//! CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};

use crate::domain::action::ClickPayload;

/// smart-notify - Desktop notifications with click actions
#[derive(Parser, Debug)]
#[command(name = "smart-notify")]
#[command(version)]
#[command(about = "Send desktop notifications whose click actions survive process exit")]
#[command(long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Send options (used when no subcommand is given)
    #[command(flatten)]
    pub send: SendArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a notification (default)
    Send(SendArgs),
    /// List delivered and pending notifications
    List(ListArgs),
    /// Remove notifications by group or all at once
    Remove(RemoveArgs),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options for sending a notification
#[derive(Args, Debug, Clone, Default)]
pub struct SendArgs {
    /// Notification body (read from stdin when omitted and stdin is piped)
    #[arg(short = 'm', long, value_name = "TEXT")]
    pub message: Option<String>,

    /// Notification title (defaults to the app name)
    #[arg(short = 't', long, value_name = "TEXT")]
    pub title: Option<String>,

    /// Secondary line shown under the title
    #[arg(long, value_name = "TEXT")]
    pub subtitle: Option<String>,

    /// Sound to play ("default" or a system sound name)
    #[arg(long, value_name = "NAME")]
    pub sound: Option<String>,

    /// Group id; posting to the same group replaces the previous notification
    #[arg(short = 'g', long, value_name = "ID")]
    pub group: Option<String>,

    /// Application to activate on click (name or bundle/desktop id)
    #[arg(long, value_name = "APP")]
    pub activate: Option<String>,

    /// Application name shown as the sender
    #[arg(long, value_name = "APP")]
    pub sender: Option<String>,

    /// Icon shown with the notification (path or URL)
    #[arg(long, alias = "appIcon", value_name = "IMAGE")]
    pub app_icon: Option<String>,

    /// Image attached to the notification body (path or URL)
    #[arg(long, alias = "contentImage", value_name = "IMAGE")]
    pub content_image: Option<String>,

    /// URL to open on click
    #[arg(short = 'o', long, value_name = "URL")]
    pub open: Option<String>,

    /// Shell command to run on click
    #[arg(short = 'e', long, value_name = "COMMAND")]
    pub execute: Option<String>,

    /// Deliver with critical urgency, bypassing do-not-disturb
    #[arg(long, alias = "ignoreDnD")]
    pub ignore_dnd: bool,

    /// Wait for an interaction until dismissed or signalled
    #[arg(long)]
    pub persist: bool,

    /// List notifications (same as the list subcommand)
    #[arg(long, hide = true, value_name = "GROUP", num_args = 0..=1, default_missing_value = "ALL")]
    pub list: Option<String>,

    /// Remove a group's notifications (same as the remove subcommand)
    #[arg(long, hide = true, value_name = "GROUP")]
    pub remove: Option<String>,
}

impl SendArgs {
    /// Click actions requested on the command line
    pub fn payload(&self) -> ClickPayload {
        ClickPayload {
            open: self.open.clone(),
            execute: self.execute.clone(),
            activate: self.activate.clone(),
        }
    }
}

/// Options for listing notifications
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only show this group
    #[arg(short = 'g', long, value_name = "ID")]
    pub group: Option<String>,

    /// Show every field
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

/// Options for removing notifications
#[derive(Args, Debug, Clone, Default)]
pub struct RemoveArgs {
    /// Remove this group's notifications
    #[arg(short = 'g', long, value_name = "ID", conflicts_with = "all")]
    pub group: Option<String>,

    /// Remove every notification
    #[arg(long)]
    pub all: bool,
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "app_name",
    "freshness_window",
    "retention_window",
    "interaction_timeout",
    "grace_period",
    "command_timeout",
    "mailbox_dir",
];

/// Keys holding a duration value
pub const DURATION_CONFIG_KEYS: &[&str] = &[
    "freshness_window",
    "retention_window",
    "interaction_timeout",
    "grace_period",
    "command_timeout",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
