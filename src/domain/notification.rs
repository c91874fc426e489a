//! Notification request and delivery records

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::{ClickPayload, ACTION_CLOSED};
use super::sound::SoundName;

/// A validated notification ready to post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    /// Stable identifier (the group id when grouping, else a fresh UUID)
    pub identifier: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub body: String,
    pub group: Option<String>,
    pub sound: Option<SoundName>,
    pub app_icon: Option<PathBuf>,
    pub content_image: Option<PathBuf>,
    pub payload: ClickPayload,
    /// Displayed application name
    pub sender: Option<String>,
    /// Bypass do-not-disturb
    pub critical: bool,
}

impl NotificationRequest {
    pub fn new(identifier: impl Into<String>, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            title: title.into(),
            subtitle: None,
            body: body.into(),
            group: None,
            sound: None,
            app_icon: None,
            content_image: None,
            payload: ClickPayload::default(),
            sender: None,
            critical: false,
        }
    }

    /// Key/value data attached to the notification, as shown by `list -v`
    pub fn user_info(&self) -> BTreeMap<String, String> {
        let mut info = BTreeMap::new();
        if let Some(url) = &self.payload.open {
            info.insert("open".to_string(), url.clone());
        }
        if let Some(command) = &self.payload.execute {
            info.insert("execute".to_string(), command.clone());
        }
        if let Some(app) = &self.payload.activate {
            info.insert("activate".to_string(), app.clone());
        }
        if let Some(group) = &self.group {
            info.insert("group".to_string(), group.clone());
        }
        info
    }
}

/// A delivered or pending notification, as reported by the notification center.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationInfo {
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub body: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub user_info: BTreeMap<String, String>,
    pub delivered_at: DateTime<Utc>,
    #[serde(default)]
    pub is_pending: bool,
}

impl NotificationInfo {
    /// Build a delivered record from a posted request
    pub fn delivered(request: &NotificationRequest, delivered_at: DateTime<Utc>) -> Self {
        Self {
            identifier: request.identifier.clone(),
            title: request.title.clone(),
            subtitle: request.subtitle.clone(),
            body: request.body.clone(),
            group: request.group.clone(),
            user_info: request.user_info(),
            delivered_at,
            is_pending: false,
        }
    }

    /// Whether this notification belongs to the given group (`None` matches all)
    pub fn in_group(&self, group: Option<&str>) -> bool {
        match group {
            None => true,
            Some(g) => self.group.as_deref() == Some(g),
        }
    }
}

/// A user interaction with a posted notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionEvent {
    pub notification_id: String,
    pub action_id: String,
}

impl InteractionEvent {
    pub fn new(notification_id: impl Into<String>, action_id: impl Into<String>) -> Self {
        Self {
            notification_id: notification_id.into(),
            action_id: action_id.into(),
        }
    }

    /// The notification was closed without choosing an action
    pub fn is_dismissal(&self) -> bool {
        self.action_id == ACTION_CLOSED
    }
}
