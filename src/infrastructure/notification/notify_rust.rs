//! Notification center adapter using notify-rust
//!
//! Works on Linux/BSD (freedesktop), macOS and Windows. Interactions and
//! closing by id are only available on freedesktop servers.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use notify_rust::Notification;
use tracing::{debug, warn};

use crate::application::ports::{InteractionCallback, NotificationCenter, NotificationError};
use crate::domain::action::ACTION_DEFAULT;
use crate::domain::config::DEFAULT_APP_NAME;
use crate::domain::notification::{InteractionEvent, NotificationInfo, NotificationRequest};

use super::ledger::{DeliveryLedger, LedgerEntry};

/// Freedesktop sound theme name used for the `default` sound
#[cfg(all(unix, not(target_os = "macos")))]
const FREEDESKTOP_DEFAULT_SOUND: &str = "message-new-instant";

type SharedCallback = Arc<Mutex<Option<InteractionCallback>>>;

/// Notification center backed by notify-rust and a delivery ledger
pub struct NotifyRustCenter {
    /// Application name for notifications
    app_name: String,
    ledger: DeliveryLedger,
    callback: SharedCallback,
}

impl NotifyRustCenter {
    /// Create a new notify-rust center
    pub fn new() -> Self {
        Self::with_app_name(DEFAULT_APP_NAME)
    }

    /// Create with custom app name
    pub fn with_app_name(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            ledger: DeliveryLedger::new(),
            callback: Arc::new(Mutex::new(None)),
        }
    }

    /// Use a specific delivery ledger
    pub fn with_ledger(mut self, ledger: DeliveryLedger) -> Self {
        self.ledger = ledger;
        self
    }

    /// Body text shown on platforms without a subtitle field
    fn display_body(request: &NotificationRequest) -> String {
        match request.subtitle.as_deref().filter(|s| !s.is_empty()) {
            Some(subtitle) if cfg!(not(target_os = "macos")) => {
                format!("{}\n{}", subtitle, request.body)
            }
            _ => request.body.clone(),
        }
    }

    /// Build the platform notification for a request
    fn build(&self, request: &NotificationRequest, replaces: Option<u32>) -> Notification {
        let mut notification = Notification::new();
        notification
            .appname(request.sender.as_deref().unwrap_or(&self.app_name))
            .summary(&request.title)
            .body(&Self::display_body(request));

        #[cfg(target_os = "macos")]
        if let Some(subtitle) = &request.subtitle {
            notification.subtitle(subtitle);
        }

        if let Some(icon) = &request.app_icon {
            notification.icon(&icon.to_string_lossy());
        }

        #[cfg(all(unix, not(target_os = "macos")))]
        {
            use notify_rust::Urgency;

            if let Some(image) = &request.content_image {
                notification.image_path(&image.to_string_lossy());
            }
            if request.critical {
                notification.urgency(Urgency::Critical);
            }
            if let Some(id) = replaces {
                notification.id(id);
            }
            if !request.payload.is_empty() {
                notification.action(ACTION_DEFAULT, "Open");
            }
        }
        #[cfg(not(all(unix, not(target_os = "macos"))))]
        let _ = replaces;

        if let Some(sound) = &request.sound {
            #[cfg(all(unix, not(target_os = "macos")))]
            let name = if sound.is_default() {
                FREEDESKTOP_DEFAULT_SOUND
            } else {
                sound.as_str()
            };
            #[cfg(not(all(unix, not(target_os = "macos"))))]
            let name = if sound.is_default() {
                "Default"
            } else {
                sound.as_str()
            };
            notification.sound_name(name);
        }

        for (id, label) in request.payload.buttons() {
            notification.action(id, label);
        }

        notification
    }

    /// Show a notification and return its server id (freedesktop only).
    ///
    /// A waiter thread forwards the user's choice to the registered callback.
    #[cfg(all(unix, not(target_os = "macos")))]
    fn show(
        notification: Notification,
        identifier: String,
        callback: SharedCallback,
    ) -> Result<Option<u32>, NotificationError> {
        let (shown_tx, shown_rx) = std::sync::mpsc::channel();

        // The handle stays on the waiter thread for its whole life
        std::thread::spawn(move || {
            let handle = match notification.show() {
                Ok(handle) => handle,
                Err(e) => {
                    let _ = shown_tx.send(Err(NotificationError::SendFailed(e.to_string())));
                    return;
                }
            };
            let _ = shown_tx.send(Ok(handle.id()));

            handle.wait_for_action(|action| {
                debug!(id = %identifier, action, "Notification interaction");
                let callback = callback.lock().ok().and_then(|c| c.clone());
                if let Some(callback) = callback {
                    callback(InteractionEvent::new(identifier.clone(), action));
                }
            });
        });

        shown_rx
            .recv()
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?
            .map(Some)
    }

    #[cfg(not(all(unix, not(target_os = "macos"))))]
    fn show(
        notification: Notification,
        _identifier: String,
        _callback: SharedCallback,
    ) -> Result<Option<u32>, NotificationError> {
        notification
            .show()
            .map(|_| None)
            .map_err(|e| NotificationError::SendFailed(e.to_string()))
    }

    /// Close shown notifications by server id (freedesktop only)
    async fn close(entries: &[LedgerEntry]) {
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            let ids: Vec<u32> = entries.iter().filter_map(|e| e.server_id).collect();
            if ids.is_empty() {
                return;
            }
            let closed = tokio::task::spawn_blocking(move || {
                for id in ids {
                    // Replacing the notification yields a handle that can close it
                    match Notification::new().id(id).summary(" ").show() {
                        Ok(handle) => handle.close(),
                        Err(e) => debug!(id, error = %e, "Failed to close notification"),
                    }
                }
            })
            .await;
            if let Err(e) = closed {
                warn!(error = %e, "Close task failed");
            }
        }
        #[cfg(not(all(unix, not(target_os = "macos"))))]
        let _ = entries;
    }
}

impl Default for NotifyRustCenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationCenter for NotifyRustCenter {
    async fn request_authorization(&self) -> bool {
        #[cfg(all(unix, not(target_os = "macos")))]
        {
            match tokio::task::spawn_blocking(notify_rust::get_server_information).await {
                Ok(Ok(info)) => {
                    debug!(server = %info.name, version = %info.version, "Notification server");
                    true
                }
                Ok(Err(e)) => {
                    warn!(error = %e, "No notification server answered");
                    false
                }
                Err(e) => {
                    warn!(error = %e, "Authorization task failed");
                    false
                }
            }
        }
        #[cfg(not(all(unix, not(target_os = "macos"))))]
        {
            true
        }
    }

    async fn post(&self, request: &NotificationRequest) -> Result<String, NotificationError> {
        let replaces = self.ledger.server_id(&request.identifier).await;
        let notification = self.build(request, replaces);
        let identifier = request.identifier.clone();
        let callback = Arc::clone(&self.callback);

        // notify-rust operations can block, so run in spawn_blocking
        let server_id = tokio::task::spawn_blocking(move || {
            Self::show(notification, identifier, callback)
        })
        .await
        .map_err(|e| NotificationError::SendFailed(format!("Task join error: {}", e)))??;

        let entry = LedgerEntry {
            info: NotificationInfo::delivered(request, Utc::now()),
            server_id,
        };
        if let Err(e) = self.ledger.record(entry).await {
            warn!(error = %e, "Failed to record delivered notification");
        }

        Ok(request.identifier.clone())
    }

    fn on_interaction(&self, callback: InteractionCallback) {
        if let Ok(mut slot) = self.callback.lock() {
            *slot = Some(callback);
        }
    }

    async fn query_delivered(&self) -> Result<Vec<NotificationInfo>, NotificationError> {
        let mut delivered: Vec<NotificationInfo> = self
            .ledger
            .load()
            .await
            .into_iter()
            .map(|e| e.info)
            .collect();
        delivered.sort_by(|a, b| b.delivered_at.cmp(&a.delivered_at));
        Ok(delivered)
    }

    async fn query_pending(&self) -> Result<Vec<NotificationInfo>, NotificationError> {
        // Freedesktop servers have no scheduled delivery
        Ok(Vec::new())
    }

    async fn remove(&self, identifiers: &[String]) -> Result<usize, NotificationError> {
        let removed = self
            .ledger
            .take(|e| identifiers.contains(&e.info.identifier))
            .await?;
        Self::close(&removed).await;
        Ok(removed.len())
    }

    async fn remove_all(&self) -> Result<usize, NotificationError> {
        let removed = self.ledger.take(|_| true).await?;
        Self::close(&removed).await;
        Ok(removed.len())
    }
}
