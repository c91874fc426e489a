//! Handoff store port interface

use thiserror::Error;

use crate::domain::action::ActionPayload;

/// Handoff store errors
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Failed to prepare mailbox directory: {0}")]
    Directory(String),

    #[error("Failed to serialize context record: {0}")]
    Serialize(String),

    #[error("Failed to write context record: {0}")]
    Write(String),
}

/// Port for the on-disk mailbox bridging a send to a later relaunch.
///
/// Synchronous; records are a handful of tiny files read before any async
/// work starts.
pub trait HandoffStore: Send + Sync {
    /// Persist the click action of a posted notification.
    ///
    /// # Arguments
    /// * `notification_id` - Identifier of the posted notification (record key)
    /// * `action` - Action to run when the notification is clicked
    fn store(&self, notification_id: &str, action: &ActionPayload) -> Result<(), StoreError>;

    /// Claim and delete the newest fresh record.
    ///
    /// # Returns
    /// The record's action, or None when nothing fresh is pending or any
    /// I/O error occurs
    fn consume_pending(&self) -> Option<ActionPayload>;

    /// Delete records older than the retention window.
    ///
    /// # Returns
    /// Number of records removed
    fn purge_expired(&self) -> usize;

    /// Delete the record of one notification, if present.
    ///
    /// Used when the still-running sender accepts a click itself.
    fn discard(&self, notification_id: &str) -> bool;
}

impl<T: HandoffStore + ?Sized> HandoffStore for &T {
    fn store(&self, notification_id: &str, action: &ActionPayload) -> Result<(), StoreError> {
        (**self).store(notification_id, action)
    }

    fn consume_pending(&self) -> Option<ActionPayload> {
        (**self).consume_pending()
    }

    fn purge_expired(&self) -> usize {
        (**self).purge_expired()
    }

    fn discard(&self, notification_id: &str) -> bool {
        (**self).discard(notification_id)
    }
}
