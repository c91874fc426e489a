//! Click actions attached to notifications

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::InvalidActionError;

/// Action identifier sent when the notification body is clicked
pub const ACTION_DEFAULT: &str = "default";

/// Action identifier of the "Open" button
pub const ACTION_OPEN_URL: &str = "open-url";

/// Action identifier of the "Execute" button
pub const ACTION_EXECUTE: &str = "execute-command";

/// Action identifier of the "Activate" button
pub const ACTION_ACTIVATE: &str = "activate-app";

/// Action identifier reported when the notification is dismissed
pub const ACTION_CLOSED: &str = "__closed";

/// A single resolved click action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ActionPayload {
    /// Open a URL with the system handler
    OpenUrl(String),
    /// Run a shell command
    RunCommand(String),
    /// Bring an application to the foreground (bundle/desktop id or name)
    ActivateApp(String),
}

impl ActionPayload {
    /// Short machine name of the action kind
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::OpenUrl(_) => "open_url",
            Self::RunCommand(_) => "run_command",
            Self::ActivateApp(_) => "activate_app",
        }
    }

    /// The action argument (URL, command or application)
    pub fn value(&self) -> &str {
        match self {
            Self::OpenUrl(v) | Self::RunCommand(v) | Self::ActivateApp(v) => v,
        }
    }
}

impl fmt::Display for ActionPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenUrl(url) => write!(f, "open {}", url),
            Self::RunCommand(command) => write!(f, "run `{}`", command),
            Self::ActivateApp(target) => write!(f, "activate {}", target),
        }
    }
}

/// Click payload carried by a posted notification.
///
/// Several actions may be attached at once; each gets its own button and the
/// notification body click picks one of them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activate: Option<String>,
}

impl ClickPayload {
    /// True when no click action is attached
    pub fn is_empty(&self) -> bool {
        self.open.is_none() && self.execute.is_none() && self.activate.is_none()
    }

    /// Reject actions whose value is blank
    pub fn validate(&self) -> Result<(), InvalidActionError> {
        let fields = [
            ("open", &self.open),
            ("execute", &self.execute),
            ("activate", &self.activate),
        ];
        for (kind, value) in fields {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(InvalidActionError {
                    kind,
                    reason: "value must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Action for a click on the notification body.
    /// Priority: open > execute > activate.
    pub fn default_action(&self) -> Option<ActionPayload> {
        self.open
            .clone()
            .map(ActionPayload::OpenUrl)
            .or_else(|| self.execute.clone().map(ActionPayload::RunCommand))
            .or_else(|| self.activate.clone().map(ActionPayload::ActivateApp))
    }

    /// Resolve an action identifier reported by the notification server.
    ///
    /// Button identifiers may carry a per-notification suffix
    /// (e.g. `open-url-<id>`). Dismissal and unknown identifiers resolve to
    /// nothing.
    pub fn action_for(&self, action_id: &str) -> Option<ActionPayload> {
        let matches = |prefix: &str| {
            action_id == prefix
                || action_id
                    .strip_prefix(prefix)
                    .is_some_and(|rest| rest.starts_with('-'))
        };

        if action_id == ACTION_DEFAULT {
            self.default_action()
        } else if matches(ACTION_OPEN_URL) {
            self.open.clone().map(ActionPayload::OpenUrl)
        } else if matches(ACTION_EXECUTE) {
            self.execute.clone().map(ActionPayload::RunCommand)
        } else if matches(ACTION_ACTIVATE) {
            self.activate.clone().map(ActionPayload::ActivateApp)
        } else {
            None
        }
    }

    /// Buttons to show as (identifier, label)
    pub fn buttons(&self) -> Vec<(&'static str, &'static str)> {
        let mut buttons = Vec::new();
        if self.open.is_some() {
            buttons.push((ACTION_OPEN_URL, "Open"));
        }
        if self.execute.is_some() {
            buttons.push((ACTION_EXECUTE, "Execute"));
        }
        if self.activate.is_some() {
            buttons.push((ACTION_ACTIVATE, "Activate"));
        }
        buttons
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_payload() -> ClickPayload {
        ClickPayload {
            open: Some("https://example.com".to_string()),
            execute: Some("echo hi".to_string()),
            activate: Some("org.mozilla.firefox".to_string()),
        }
    }

    #[test]
    fn default_action_prefers_open() {
        let payload = full_payload();
        assert_eq!(
            payload.default_action(),
            Some(ActionPayload::OpenUrl("https://example.com".to_string()))
        );
    }

    #[test]
    fn default_action_falls_back_to_execute_then_activate() {
        let mut payload = full_payload();
        payload.open = None;
        assert_eq!(
            payload.default_action(),
            Some(ActionPayload::RunCommand("echo hi".to_string()))
        );

        payload.execute = None;
        assert_eq!(
            payload.default_action(),
            Some(ActionPayload::ActivateApp("org.mozilla.firefox".to_string()))
        );
    }

    #[test]
    fn empty_payload_has_no_action() {
        let payload = ClickPayload::default();
        assert!(payload.is_empty());
        assert!(payload.default_action().is_none());
        assert!(payload.buttons().is_empty());
    }

    #[test]
    fn action_for_buttons() {
        let payload = full_payload();
        assert_eq!(
            payload.action_for("execute-command"),
            Some(ActionPayload::RunCommand("echo hi".to_string()))
        );
        assert_eq!(
            payload.action_for("activate-app-1234"),
            Some(ActionPayload::ActivateApp("org.mozilla.firefox".to_string()))
        );
        assert_eq!(
            payload.action_for("open-url"),
            Some(ActionPayload::OpenUrl("https://example.com".to_string()))
        );
    }

    #[test]
    fn action_for_dismissal_and_unknown() {
        let payload = full_payload();
        assert!(payload.action_for(ACTION_CLOSED).is_none());
        assert!(payload.action_for("snooze").is_none());
        assert!(payload.action_for("open-urlish").is_none());
    }

    #[test]
    fn action_for_missing_button_value() {
        let payload = ClickPayload {
            open: Some("https://example.com".to_string()),
            ..Default::default()
        };
        assert!(payload.action_for(ACTION_EXECUTE).is_none());
    }

    #[test]
    fn validate_rejects_blank_values() {
        let payload = ClickPayload {
            execute: Some("   ".to_string()),
            ..Default::default()
        };
        let err = payload.validate().unwrap_err();
        assert_eq!(err.kind, "execute");
        assert!(full_payload().validate().is_ok());
    }

    #[test]
    fn buttons_follow_payload() {
        let payload = full_payload();
        let ids: Vec<_> = payload.buttons().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![ACTION_OPEN_URL, ACTION_EXECUTE, ACTION_ACTIVATE]);
    }

    #[test]
    fn action_serializes_tagged() {
        let action = ActionPayload::OpenUrl("https://example.com".to_string());
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "open_url");
        assert_eq!(json["value"], "https://example.com");
    }

    #[test]
    fn action_display() {
        let action = ActionPayload::RunCommand("make test".to_string());
        assert_eq!(action.to_string(), "run `make test`");
        assert_eq!(action.kind(), "run_command");
        assert_eq!(action.value(), "make test");
    }
}
