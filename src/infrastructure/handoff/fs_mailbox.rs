//! Filesystem mailbox for launch-context handoff
//!
//! - One `<id>.json` record per posted notification
//! - Atomic writes (temp file + fsync + rename)
//! - Atomic claims (rename into a private hidden name) so concurrent
//!   relaunches never consume the same record twice
//! - Record age is the file modification time

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration as StdDuration, SystemTime};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::ports::{HandoffStore, StoreError};
use crate::domain::action::ActionPayload;
use crate::domain::context::ContextRecord;
use crate::domain::duration::Duration;

const RECORD_EXTENSION: &str = "json";
const CLAIM_PREFIX: &str = ".claim-";

/// A record file and how long ago it was written
struct RecordEntry {
    path: PathBuf,
    age: StdDuration,
}

/// Mailbox directory holding pending handoff records.
#[derive(Debug, Clone)]
pub struct FsMailbox {
    dir: PathBuf,
    freshness: StdDuration,
    retention: StdDuration,
}

impl FsMailbox {
    /// Create a mailbox in `dir` with the default 30s freshness and 5m retention
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            freshness: Duration::default_freshness_window().as_std(),
            retention: Duration::default_retention_window().as_std(),
        }
    }

    /// Override the freshness and retention windows
    pub fn with_windows(mut self, freshness: StdDuration, retention: StdDuration) -> Self {
        self.freshness = freshness;
        self.retention = retention;
        self
    }

    /// Mailbox directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map a notification id to a safe file stem
    fn sanitize_id(id: &str) -> String {
        let sanitized: String = id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        let sanitized = sanitized.trim_start_matches('.');
        if sanitized.is_empty() {
            "notification".to_string()
        } else {
            sanitized.to_string()
        }
    }

    fn record_path(&self, id: &str) -> PathBuf {
        self.dir
            .join(format!("{}.{}", Self::sanitize_id(id), RECORD_EXTENSION))
    }

    /// Ensure the mailbox directory exists with owner-only permissions
    fn ensure_dir(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o700))?;
        }
        Ok(())
    }

    fn age_of(metadata: &fs::Metadata, now: SystemTime) -> StdDuration {
        metadata
            .modified()
            .ok()
            .and_then(|mtime| now.duration_since(mtime).ok())
            .unwrap_or(StdDuration::ZERO)
    }

    /// Visible record files, newest first
    fn list_records(&self) -> io::Result<Vec<RecordEntry>> {
        let now = SystemTime::now();
        let mut records = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let path = entry.path();

            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }

            let metadata = match entry.metadata() {
                Ok(metadata) => metadata,
                // Claimed by a concurrent consumer since read_dir
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => return Err(e),
            };
            if !metadata.is_file() {
                continue;
            }
            records.push(RecordEntry {
                age: Self::age_of(&metadata, now),
                path,
            });
        }

        records.sort_by_key(|r| r.age);
        Ok(records)
    }

    fn write_atomic(&self, final_path: &Path, bytes: &[u8]) -> io::Result<()> {
        let stem = final_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("record");
        let temp_path = self
            .dir
            .join(format!(".{}.{}.tmp", stem, Uuid::new_v4().simple()));

        let result = (|| {
            let mut file = fs::File::create(&temp_path)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                file.set_permissions(fs::Permissions::from_mode(0o600))?;
            }
            file.write_all(bytes)?;
            file.sync_all()?;
            drop(file);
            fs::rename(&temp_path, final_path)
        })();

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    /// Rename a record into a private name; None when another process won
    fn claim(&self, record: &Path) -> Option<PathBuf> {
        let claim_path = self
            .dir
            .join(format!("{}{}.json", CLAIM_PREFIX, Uuid::new_v4().simple()));

        match fs::rename(record, &claim_path) {
            Ok(()) => Some(claim_path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %record.display(), "Record already claimed");
                None
            }
            Err(e) => {
                debug!(path = %record.display(), error = %e, "Failed to claim record");
                None
            }
        }
    }

    /// Read and delete a claimed record. Corrupt bodies are deleted too.
    fn take_claimed(claim_path: &Path) -> Option<ContextRecord> {
        let content = fs::read(claim_path);
        if let Err(e) = fs::remove_file(claim_path) {
            debug!(path = %claim_path.display(), error = %e, "Failed to delete claimed record");
        }

        let content = match content {
            Ok(content) => content,
            Err(e) => {
                debug!(error = %e, "Failed to read claimed record");
                return None;
            }
        };

        match serde_json::from_slice::<ContextRecord>(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(error = %e, "Discarding corrupt handoff record");
                None
            }
        }
    }

    /// Delete leftover hidden temp and claim files past retention
    fn sweep_hidden(&self, now: SystemTime) -> usize {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return 0;
        };

        let mut removed = 0;
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let leftover = name.starts_with(CLAIM_PREFIX)
                || (name.starts_with('.') && name.ends_with(".tmp"));
            if !leftover {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if Self::age_of(&metadata, now) > self.retention
                && fs::remove_file(entry.path()).is_ok()
            {
                removed += 1;
            }
        }
        removed
    }
}

impl HandoffStore for FsMailbox {
    fn store(&self, notification_id: &str, action: &ActionPayload) -> Result<(), StoreError> {
        self.ensure_dir()
            .map_err(|e| StoreError::Directory(e.to_string()))?;

        let record = ContextRecord::new(notification_id, action.clone());
        let bytes = serde_json::to_vec_pretty(&record)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;

        let path = self.record_path(notification_id);
        self.write_atomic(&path, &bytes)
            .map_err(|e| StoreError::Write(e.to_string()))?;

        debug!(path = %path.display(), kind = action.kind(), "Stored handoff record");
        Ok(())
    }

    fn consume_pending(&self) -> Option<ActionPayload> {
        let records = match self.list_records() {
            Ok(records) => records,
            Err(e) => {
                debug!(dir = %self.dir.display(), error = %e, "No readable mailbox");
                return None;
            }
        };

        for record in records.iter().filter(|r| r.age < self.freshness) {
            let Some(claim_path) = self.claim(&record.path) else {
                continue;
            };
            return Self::take_claimed(&claim_path).map(|r| r.action);
        }

        None
    }

    fn purge_expired(&self) -> usize {
        let records = match self.list_records() {
            Ok(records) => records,
            Err(_) => return 0,
        };

        let mut removed = 0;
        for record in records.iter().filter(|r| r.age > self.retention) {
            match fs::remove_file(&record.path) {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => debug!(path = %record.path.display(), error = %e, "Failed to purge record"),
            }
        }

        removed + self.sweep_hidden(SystemTime::now())
    }

    fn discard(&self, notification_id: &str) -> bool {
        fs::remove_file(self.record_path(notification_id)).is_ok()
    }
}
