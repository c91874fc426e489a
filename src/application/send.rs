//! Send notification use case

use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::action::ActionPayload;
use crate::domain::notification::NotificationRequest;

use super::ports::{HandoffStore, NotificationCenter, NotificationError};

/// Errors from the send use case
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Notification permission denied. Enable notifications for this application in your system settings.")]
    AuthorizationDenied,

    #[error("Failed to deliver notification: {0}")]
    Delivery(#[from] NotificationError),
}

/// Output from the send use case
#[derive(Debug, Clone)]
pub struct SendOutput {
    /// Identifier interactions are reported with
    pub notification_id: String,
    /// Action a relaunch will run, if any
    pub action: Option<ActionPayload>,
    /// Whether the handoff record was written
    pub handoff_stored: bool,
}

/// Identifier for a new notification: the group id, else a fresh UUID.
///
/// Re-posting with the same group replaces the earlier notification.
pub fn notification_identifier(group: Option<&str>) -> String {
    match group.map(str::trim).filter(|g| !g.is_empty()) {
        Some(group) => group.to_string(),
        None => Uuid::new_v4().to_string(),
    }
}

/// Authorizes, posts and records the relaunch handoff for one notification.
pub struct SendNotificationUseCase<N, S>
where
    N: NotificationCenter,
    S: HandoffStore,
{
    center: N,
    store: S,
}

impl<N, S> SendNotificationUseCase<N, S>
where
    N: NotificationCenter,
    S: HandoffStore,
{
    pub fn new(center: N, store: S) -> Self {
        Self { center, store }
    }

    /// Access the notification center (for interaction registration)
    pub fn center(&self) -> &N {
        &self.center
    }

    /// Execute the send.
    ///
    /// Handoff failures are logged and do not fail the send.
    pub async fn execute(&self, request: &NotificationRequest) -> Result<SendOutput, SendError> {
        if !self.center.request_authorization().await {
            return Err(SendError::AuthorizationDenied);
        }

        let notification_id = self.center.post(request).await?;
        debug!(id = %notification_id, "Notification posted");

        let action = request.payload.default_action();
        let handoff_stored = match &action {
            Some(action) => match self.store.store(&notification_id, action) {
                Ok(()) => true,
                Err(e) => {
                    warn!(error = %e, "Failed to store handoff context");
                    false
                }
            },
            None => false,
        };

        Ok(SendOutput {
            notification_id,
            action,
            handoff_stored,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{InteractionCallback, StoreError};
    use crate::domain::notification::NotificationInfo;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    struct MockCenter {
        authorized: bool,
        fail_post: bool,
        posted: Mutex<Vec<String>>,
    }

    impl MockCenter {
        fn new(authorized: bool) -> Self {
            Self {
                authorized,
                fail_post: false,
                posted: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl NotificationCenter for MockCenter {
        async fn request_authorization(&self) -> bool {
            self.authorized
        }

        async fn post(&self, request: &NotificationRequest) -> Result<String, NotificationError> {
            if self.fail_post {
                return Err(NotificationError::SendFailed("server went away".to_string()));
            }
            self.posted.lock().unwrap().push(request.identifier.clone());
            Ok(request.identifier.clone())
        }

        fn on_interaction(&self, _callback: InteractionCallback) {}

        async fn query_delivered(&self) -> Result<Vec<NotificationInfo>, NotificationError> {
            Ok(Vec::new())
        }

        async fn query_pending(&self) -> Result<Vec<NotificationInfo>, NotificationError> {
            Ok(Vec::new())
        }

        async fn remove(&self, _identifiers: &[String]) -> Result<usize, NotificationError> {
            Ok(0)
        }

        async fn remove_all(&self) -> Result<usize, NotificationError> {
            Ok(0)
        }
    }

    #[derive(Default)]
    struct MockStore {
        stored: Mutex<Vec<(String, ActionPayload)>>,
        fail: AtomicBool,
    }

    impl HandoffStore for MockStore {
        fn store(&self, id: &str, action: &ActionPayload) -> Result<(), StoreError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(StoreError::Write("disk full".to_string()));
            }
            self.stored
                .lock()
                .unwrap()
                .push((id.to_string(), action.clone()));
            Ok(())
        }

        fn consume_pending(&self) -> Option<ActionPayload> {
            None
        }

        fn purge_expired(&self) -> usize {
            0
        }

        fn discard(&self, _id: &str) -> bool {
            false
        }
    }

    fn request_with_open() -> NotificationRequest {
        let mut request = NotificationRequest::new("abc", "Title", "Body");
        request.payload.open = Some("https://example.com".to_string());
        request.payload.execute = Some("echo hi".to_string());
        request
    }

    #[tokio::test]
    async fn posts_and_stores_default_action() {
        let store = MockStore::default();
        let use_case = SendNotificationUseCase::new(MockCenter::new(true), &store);

        let output = use_case.execute(&request_with_open()).await.unwrap();

        assert_eq!(output.notification_id, "abc");
        assert!(output.handoff_stored);
        assert_eq!(
            *store.stored.lock().unwrap(),
            vec![(
                "abc".to_string(),
                ActionPayload::OpenUrl("https://example.com".to_string())
            )]
        );
    }

    #[tokio::test]
    async fn plain_notification_stores_nothing() {
        let store = MockStore::default();
        let use_case = SendNotificationUseCase::new(MockCenter::new(true), &store);

        let output = use_case
            .execute(&NotificationRequest::new("id", "Title", "Body"))
            .await
            .unwrap();

        assert!(output.action.is_none());
        assert!(!output.handoff_stored);
        assert!(store.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn denied_authorization_posts_nothing() {
        let store = MockStore::default();
        let use_case = SendNotificationUseCase::new(MockCenter::new(false), &store);

        let result = use_case.execute(&request_with_open()).await;

        assert!(matches!(result, Err(SendError::AuthorizationDenied)));
        assert!(use_case.center().posted.lock().unwrap().is_empty());
        assert!(store.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_error() {
        let mut center = MockCenter::new(true);
        center.fail_post = true;
        let store = MockStore::default();
        let use_case = SendNotificationUseCase::new(center, &store);

        let result = use_case.execute(&request_with_open()).await;
        assert!(matches!(result, Err(SendError::Delivery(_))));
        assert!(store.stored.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_not_fatal() {
        let store = MockStore::default();
        store.fail.store(true, Ordering::SeqCst);
        let use_case = SendNotificationUseCase::new(MockCenter::new(true), &store);

        let output = use_case.execute(&request_with_open()).await.unwrap();
        assert!(!output.handoff_stored);
    }

    #[test]
    fn identifier_prefers_group() {
        assert_eq!(notification_identifier(Some("build")), "build");
        let generated = notification_identifier(None);
        assert!(Uuid::parse_str(&generated).is_ok());
        assert_ne!(notification_identifier(Some("  ")), "  ");
    }
}
