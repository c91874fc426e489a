//! Launch-context classification use case

use tracing::{debug, info};

use crate::domain::context::LaunchContext;

use super::ports::HandoffStore;

/// Decides whether this process was started by a notification click.
pub struct LaunchContextClassifier<S: HandoffStore> {
    store: S,
}

impl<S: HandoffStore> LaunchContextClassifier<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Purge stale records, then claim the newest fresh one.
    ///
    /// A record is consumed at most once, so a second call in the same run
    /// returns `CommandLine`.
    pub fn classify(&self) -> LaunchContext {
        let purged = self.store.purge_expired();
        if purged > 0 {
            debug!(purged, "Purged expired handoff records");
        }

        match self.store.consume_pending() {
            Some(action) => {
                info!(kind = action.kind(), "Relaunched for notification click");
                LaunchContext::NotificationClick(action)
            }
            None => LaunchContext::CommandLine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::StoreError;
    use crate::domain::action::ActionPayload;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        records: Mutex<Vec<(String, ActionPayload)>>,
        purges: AtomicUsize,
    }

    impl HandoffStore for MemoryStore {
        fn store(&self, id: &str, action: &ActionPayload) -> Result<(), StoreError> {
            let mut records = self.records.lock().unwrap();
            records.retain(|(existing, _)| existing != id);
            records.push((id.to_string(), action.clone()));
            Ok(())
        }

        fn consume_pending(&self) -> Option<ActionPayload> {
            self.records.lock().unwrap().pop().map(|(_, action)| action)
        }

        fn purge_expired(&self) -> usize {
            self.purges.fetch_add(1, Ordering::SeqCst);
            0
        }

        fn discard(&self, id: &str) -> bool {
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|(existing, _)| existing != id);
            records.len() != before
        }
    }

    #[test]
    fn empty_store_is_command_line() {
        let store = MemoryStore::default();
        let classifier = LaunchContextClassifier::new(&store);
        assert_eq!(classifier.classify(), LaunchContext::CommandLine);
        assert_eq!(store.purges.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn pending_record_is_click_once() {
        let store = MemoryStore::default();
        store
            .store("abc", &ActionPayload::OpenUrl("https://example.com".to_string()))
            .unwrap();

        let classifier = LaunchContextClassifier::new(&store);
        assert_eq!(
            classifier.classify(),
            LaunchContext::NotificationClick(ActionPayload::OpenUrl(
                "https://example.com".to_string()
            ))
        );
        assert_eq!(classifier.classify(), LaunchContext::CommandLine);
    }
}
