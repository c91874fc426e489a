//! Notification center port interface

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::notification::{InteractionEvent, NotificationInfo, NotificationRequest};

/// Notification center errors
#[derive(Debug, Clone, Error)]
pub enum NotificationError {
    #[error("Notification server unavailable: {0}")]
    Unavailable(String),

    #[error("Failed to show notification: {0}")]
    SendFailed(String),

    #[error("Failed to query notifications: {0}")]
    QueryFailed(String),

    #[error("Failed to remove notifications: {0}")]
    RemoveFailed(String),
}

/// Callback invoked when the user interacts with a posted notification
pub type InteractionCallback = Arc<dyn Fn(InteractionEvent) + Send + Sync>;

/// Port for the desktop notification center
#[async_trait]
pub trait NotificationCenter: Send + Sync {
    /// Ask whether notifications may be shown.
    ///
    /// # Returns
    /// true when the platform accepts notifications from this program
    async fn request_authorization(&self) -> bool;

    /// Deliver a notification.
    ///
    /// # Arguments
    /// * `request` - The validated notification
    ///
    /// # Returns
    /// The identifier interactions will be reported with
    async fn post(&self, request: &NotificationRequest) -> Result<String, NotificationError>;

    /// Register the receiver for clicks, button presses and dismissals.
    /// Replaces any earlier callback.
    fn on_interaction(&self, callback: InteractionCallback);

    /// Notifications currently shown.
    async fn query_delivered(&self) -> Result<Vec<NotificationInfo>, NotificationError>;

    /// Notifications scheduled but not yet shown.
    async fn query_pending(&self) -> Result<Vec<NotificationInfo>, NotificationError>;

    /// Close notifications by identifier.
    ///
    /// # Returns
    /// Number of notifications closed
    async fn remove(&self, identifiers: &[String]) -> Result<usize, NotificationError>;

    /// Close every notification posted by this program.
    async fn remove_all(&self) -> Result<usize, NotificationError>;
}
