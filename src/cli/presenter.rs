//! CLI presenter for output formatting

use colored::*;

use crate::domain::notification::NotificationInfo;

/// Presenter for CLI output formatting
pub struct Presenter;

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// Print a notification listing to stdout
    pub fn notifications(&self, notifications: &[NotificationInfo], group: Option<&str>, verbose: bool) {
        self.output(&format_listing(notifications, group, verbose));
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

/// One-line form: `[PENDING] [group] Title: body`
pub fn format_compact(info: &NotificationInfo) -> String {
    let mut line = String::new();
    if info.is_pending {
        line.push_str("[PENDING] ");
    }
    if let Some(group) = &info.group {
        line.push_str(&format!("[{}] ", group));
    }
    line.push_str(&format!("{}: {}", info.title, info.body));
    line
}

/// Multi-line form with every field
pub fn format_verbose(info: &NotificationInfo) -> String {
    let mut lines = vec![
        format!("ID: {}", info.identifier),
        format!("Title: {}", info.title),
        format!("Body: {}", info.body),
    ];
    if let Some(subtitle) = &info.subtitle {
        lines.push(format!("Subtitle: {}", subtitle));
    }
    if let Some(group) = &info.group {
        lines.push(format!("Group: {}", group));
    }
    lines.push(format!(
        "Date: {}",
        info.delivered_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    lines.push(format!(
        "Status: {}",
        if info.is_pending { "Pending" } else { "Delivered" }
    ));
    if !info.user_info.is_empty() {
        lines.push("User Info:".to_string());
        for (key, value) in &info.user_info {
            lines.push(format!("  {}: {}", key, value));
        }
    }
    lines.join("\n")
}

/// Whole listing, or the empty-result message
pub fn format_listing(notifications: &[NotificationInfo], group: Option<&str>, verbose: bool) -> String {
    if notifications.is_empty() {
        return match group {
            Some(group) => format!("No notifications found for group '{}'", group),
            None => "No notifications found".to_string(),
        };
    }

    if verbose {
        notifications
            .iter()
            .map(format_verbose)
            .collect::<Vec<_>>()
            .join("\n\n")
    } else {
        notifications
            .iter()
            .map(format_compact)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
