//! Launch context handed from a sending invocation to a relaunched one

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::action::ActionPayload;

/// Record persisted in the handoff mailbox at send time.
///
/// Unknown fields are ignored on read so newer writers stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextRecord {
    pub notification_id: String,
    pub action: ActionPayload,
    /// Mirror of an `OpenUrl` action for readers that only know URLs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ContextRecord {
    /// Create a record stamped with the current time
    pub fn new(notification_id: impl Into<String>, action: ActionPayload) -> Self {
        let url = match &action {
            ActionPayload::OpenUrl(url) => Some(url.clone()),
            _ => None,
        };
        Self {
            notification_id: notification_id.into(),
            action,
            url,
            timestamp: Utc::now(),
        }
    }
}

/// How the current process was started.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchContext {
    /// Regular command-line invocation
    CommandLine,
    /// Relaunch caused by a click on an earlier notification
    NotificationClick(ActionPayload),
}

impl LaunchContext {
    pub fn is_notification_click(&self) -> bool {
        matches!(self, Self::NotificationClick(_))
    }
}
