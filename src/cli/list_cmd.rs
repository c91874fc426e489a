//! List and remove command handlers

use crate::application::ports::{NotificationCenter, NotificationError};
use crate::domain::error::ValidationError;

use super::args::{ListArgs, RemoveArgs};
use super::presenter::Presenter;

/// Errors from the list and remove commands
#[derive(Debug, thiserror::Error)]
pub enum ManageError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Center(#[from] NotificationError),
}

/// Handle the list command
pub async fn handle_list<N: NotificationCenter>(
    args: ListArgs,
    center: &N,
    presenter: &Presenter,
) -> Result<(), ManageError> {
    let group = args.group.as_deref();

    let mut notifications = center.query_delivered().await?;
    notifications.extend(center.query_pending().await?);
    notifications.retain(|n| n.in_group(group));

    presenter.notifications(&notifications, group, args.verbose);
    Ok(())
}

/// Handle the remove command
pub async fn handle_remove<N: NotificationCenter>(
    args: RemoveArgs,
    center: &N,
    presenter: &Presenter,
) -> Result<(), ManageError> {
    if args.all {
        center.remove_all().await?;
        presenter.success("All notifications removed");
        return Ok(());
    }

    let Some(group) = args.group.as_deref().map(str::trim).filter(|g| !g.is_empty()) else {
        return Err(ValidationError::MissingRemoveTarget.into());
    };

    let identifiers: Vec<String> = center
        .query_delivered()
        .await?
        .into_iter()
        .filter(|n| n.in_group(Some(group)))
        .map(|n| n.identifier)
        .collect();

    let removed = center.remove(&identifiers).await?;
    presenter.success(&format!(
        "Removed {} notification(s) from group '{}'",
        removed, group
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::InteractionCallback;
    use crate::domain::notification::{NotificationInfo, NotificationRequest};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    struct LedgerCenter {
        delivered: Mutex<Vec<NotificationInfo>>,
    }

    impl LedgerCenter {
        fn with(entries: &[(&str, Option<&str>)]) -> Self {
            let delivered = entries
                .iter()
                .map(|(id, group)| {
                    let mut request = NotificationRequest::new(*id, "Title", "Body");
                    request.group = group.map(str::to_string);
                    NotificationInfo::delivered(&request, Utc::now())
                })
                .collect();
            Self {
                delivered: Mutex::new(delivered),
            }
        }

        fn remaining(&self) -> Vec<String> {
            self.delivered
                .lock()
                .unwrap()
                .iter()
                .map(|n| n.identifier.clone())
                .collect()
        }
    }

    #[async_trait]
    impl NotificationCenter for LedgerCenter {
        async fn request_authorization(&self) -> bool {
            true
        }

        async fn post(&self, request: &NotificationRequest) -> Result<String, NotificationError> {
            Ok(request.identifier.clone())
        }

        fn on_interaction(&self, _callback: InteractionCallback) {}

        async fn query_delivered(&self) -> Result<Vec<NotificationInfo>, NotificationError> {
            Ok(self.delivered.lock().unwrap().clone())
        }

        async fn query_pending(&self) -> Result<Vec<NotificationInfo>, NotificationError> {
            Ok(Vec::new())
        }

        async fn remove(&self, identifiers: &[String]) -> Result<usize, NotificationError> {
            let mut delivered = self.delivered.lock().unwrap();
            let before = delivered.len();
            delivered.retain(|n| !identifiers.contains(&n.identifier));
            Ok(before - delivered.len())
        }

        async fn remove_all(&self) -> Result<usize, NotificationError> {
            let mut delivered = self.delivered.lock().unwrap();
            let count = delivered.len();
            delivered.clear();
            Ok(count)
        }
    }

    #[tokio::test]
    async fn list_succeeds_for_any_group() {
        let center = LedgerCenter::with(&[("a", Some("ci")), ("b", None)]);
        let args = ListArgs {
            group: Some("ci".to_string()),
            verbose: true,
        };
        assert!(handle_list(args, &center, &Presenter::new()).await.is_ok());
    }

    #[tokio::test]
    async fn remove_requires_target() {
        let center = LedgerCenter::with(&[("a", Some("ci"))]);
        let result = handle_remove(RemoveArgs::default(), &center, &Presenter::new()).await;
        assert!(matches!(
            result,
            Err(ManageError::Validation(ValidationError::MissingRemoveTarget))
        ));
        assert_eq!(center.remaining(), vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn remove_group_only_touches_group() {
        let center = LedgerCenter::with(&[("ci", Some("ci")), ("b", None), ("c", Some("docs"))]);
        let args = RemoveArgs {
            group: Some("ci".to_string()),
            all: false,
        };
        handle_remove(args, &center, &Presenter::new()).await.unwrap();
        assert_eq!(center.remaining(), vec!["b".to_string(), "c".to_string()]);
    }

    #[tokio::test]
    async fn remove_all_clears_everything() {
        let center = LedgerCenter::with(&[("a", Some("ci")), ("b", None)]);
        let args = RemoveArgs {
            group: None,
            all: true,
        };
        handle_remove(args, &center, &Presenter::new()).await.unwrap();
        assert!(center.remaining().is_empty());
    }
}
