//! Delivery ledger
//!
//! Freedesktop notification servers cannot enumerate what they show, so every
//! post is recorded here for `list` and `remove`.

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::application::ports::NotificationError;
use crate::domain::notification::NotificationInfo;

/// How long delivered notifications stay listed
const LEDGER_RETENTION_HOURS: i64 = 24;

/// A delivered notification and the server id needed to close it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    #[serde(flatten)]
    pub info: NotificationInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<u32>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    #[serde(default)]
    notifications: Vec<LedgerEntry>,
}

/// JSON file of delivered notifications under the XDG state dir
#[derive(Debug, Clone)]
pub struct DeliveryLedger {
    path: PathBuf,
    retention: ChronoDuration,
}

impl DeliveryLedger {
    /// Create a ledger at `$XDG_STATE_HOME/smart-notify/delivered.json`
    pub fn new() -> Self {
        let state_dir = dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("smart-notify");

        Self::with_path(state_dir.join("delivered.json"))
    }

    /// Create with custom path
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            retention: ChronoDuration::hours(LEDGER_RETENTION_HOURS),
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn prune(&self, entries: &mut Vec<LedgerEntry>, now: DateTime<Utc>) {
        let cutoff = now - self.retention;
        entries.retain(|e| e.info.delivered_at > cutoff);
    }

    /// Load live entries. A missing or corrupt ledger reads as empty.
    pub async fn load(&self) -> Vec<LedgerEntry> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    debug!(path = %self.path.display(), error = %e, "Failed to read ledger");
                }
                return Vec::new();
            }
        };

        let mut entries = match serde_json::from_slice::<LedgerFile>(&content) {
            Ok(file) => file.notifications,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Ignoring corrupt delivery ledger");
                Vec::new()
            }
        };
        self.prune(&mut entries, Utc::now());
        entries
    }

    /// Hold an exclusive advisory lock on `<ledger>.lock` until the file drops
    async fn lock(&self) -> io::Result<std::fs::File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let lock_path = self.path.with_extension("json.lock");

        tokio::task::spawn_blocking(move || {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .truncate(false)
                .write(true)
                .open(&lock_path)?;
            file.lock_exclusive()?;
            Ok::<_, io::Error>(file)
        })
        .await
        .map_err(io::Error::other)?
    }

    async fn save(&self, entries: Vec<LedgerEntry>) -> Result<(), NotificationError> {
        let write_err = |e: String| NotificationError::SendFailed(format!("ledger: {}", e));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| write_err(e.to_string()))?;
        }

        let content = serde_json::to_vec_pretty(&LedgerFile {
            notifications: entries,
        })
        .map_err(|e| write_err(e.to_string()))?;

        let temp_path = self.path.with_extension(format!("json.tmp.{}", std::process::id()));
        fs::write(&temp_path, content)
            .await
            .map_err(|e| write_err(e.to_string()))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| write_err(e.to_string()))?;
        Ok(())
    }

    /// Record a delivery, replacing any entry with the same identifier
    pub async fn record(&self, entry: LedgerEntry) -> Result<(), NotificationError> {
        let _lock = self
            .lock()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("ledger lock: {}", e)))?;
        let mut entries = self.load().await;
        entries.retain(|e| e.info.identifier != entry.info.identifier);
        entries.push(entry);
        self.save(entries).await
    }

    /// Server id of the live entry with this identifier
    pub async fn server_id(&self, identifier: &str) -> Option<u32> {
        self.load()
            .await
            .into_iter()
            .find(|e| e.info.identifier == identifier)
            .and_then(|e| e.server_id)
    }

    /// Remove entries matching the predicate and return them
    pub async fn take<F>(&self, predicate: F) -> Result<Vec<LedgerEntry>, NotificationError>
    where
        F: Fn(&LedgerEntry) -> bool,
    {
        let _lock = self
            .lock()
            .await
            .map_err(|e| NotificationError::RemoveFailed(format!("ledger lock: {}", e)))?;
        let entries = self.load().await;
        let (taken, kept): (Vec<_>, Vec<_>) = entries.into_iter().partition(|e| predicate(e));
        if !taken.is_empty() {
            self.save(kept)
                .await
                .map_err(|e| NotificationError::RemoveFailed(e.to_string()))?;
        }
        Ok(taken)
    }
}

impl Default for DeliveryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::NotificationRequest;
    use tempfile::TempDir;

    fn entry(id: &str, group: Option<&str>, delivered_at: DateTime<Utc>) -> LedgerEntry {
        let mut request = NotificationRequest::new(id, "Title", "Body");
        request.group = group.map(str::to_string);
        LedgerEntry {
            info: NotificationInfo::delivered(&request, delivered_at),
            server_id: Some(7),
        }
    }

    fn ledger() -> (TempDir, DeliveryLedger) {
        let dir = TempDir::new().unwrap();
        let ledger = DeliveryLedger::with_path(dir.path().join("state").join("delivered.json"));
        (dir, ledger)
    }

    #[tokio::test]
    async fn missing_ledger_is_empty() {
        let (_dir, ledger) = ledger();
        assert!(ledger.load().await.is_empty());
    }

    #[tokio::test]
    async fn record_and_load() {
        let (_dir, ledger) = ledger();
        ledger.record(entry("a", None, Utc::now())).await.unwrap();
        ledger.record(entry("b", Some("ci"), Utc::now())).await.unwrap();

        let entries = ledger.load().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(ledger.server_id("b").await, Some(7));
    }

    #[tokio::test]
    async fn same_identifier_replaces() {
        let (_dir, ledger) = ledger();
        ledger.record(entry("ci", Some("ci"), Utc::now())).await.unwrap();
        let mut newer = entry("ci", Some("ci"), Utc::now());
        newer.info.body = "second".to_string();
        ledger.record(newer).await.unwrap();

        let entries = ledger.load().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].info.body, "second");
    }

    #[tokio::test]
    async fn old_entries_are_pruned() {
        let (_dir, ledger) = ledger();
        ledger
            .record(entry("old", None, Utc::now() - ChronoDuration::hours(25)))
            .await
            .unwrap();
        ledger.record(entry("new", None, Utc::now())).await.unwrap();

        let ids: Vec<_> = ledger
            .load()
            .await
            .into_iter()
            .map(|e| e.info.identifier)
            .collect();
        assert_eq!(ids, vec!["new"]);
    }

    #[tokio::test]
    async fn take_by_group() {
        let (_dir, ledger) = ledger();
        ledger.record(entry("a", Some("ci"), Utc::now())).await.unwrap();
        ledger.record(entry("b", Some("deploy"), Utc::now())).await.unwrap();

        let taken = ledger
            .take(|e| e.info.in_group(Some("ci")))
            .await
            .unwrap();
        assert_eq!(taken.len(), 1);
        assert_eq!(ledger.load().await.len(), 1);
    }

    #[tokio::test]
    async fn corrupt_ledger_reads_empty() {
        let (_dir, ledger) = ledger();
        std::fs::create_dir_all(ledger.path().parent().unwrap()).unwrap();
        std::fs::write(ledger.path(), b"[[[").unwrap();
        assert!(ledger.load().await.is_empty());

        ledger.record(entry("a", None, Utc::now())).await.unwrap();
        assert_eq!(ledger.load().await.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_records_are_all_kept() {
        let (_dir, ledger) = ledger();

        let tasks: Vec<_> = (0..12)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .record(entry(&format!("n{}", i), None, Utc::now()))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        assert_eq!(ledger.load().await.len(), 12);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn take_and_record_do_not_lose_entries() {
        let (_dir, ledger) = ledger();
        for i in 0..6 {
            ledger
                .record(entry(&format!("old{}", i), Some("ci"), Utc::now()))
                .await
                .unwrap();
        }

        let remover = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.take(|e| e.info.in_group(Some("ci"))).await })
        };
        let writers: Vec<_> = (0..6)
            .map(|i| {
                let ledger = ledger.clone();
                tokio::spawn(async move {
                    ledger
                        .record(entry(&format!("new{}", i), Some("deploy"), Utc::now()))
                        .await
                })
            })
            .collect();

        assert_eq!(remover.await.unwrap().unwrap().len(), 6);
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let entries = ledger.load().await;
        assert_eq!(entries.len(), 6);
        assert!(entries.iter().all(|e| e.info.in_group(Some("deploy"))));
    }
}
