//! Append-only `FileOperationRecord` history, so organize runs remain
//! auditable and bounded undo is possible.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use reelsort_core::FileOperationRecord;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::OrganizeResult;

/// A JSON-Lines append-only log of every organize operation attempted.
pub struct OperationHistory {
    path: PathBuf,
    next_sequence: AtomicU64,
    write_lock: Mutex<()>,
}

impl OperationHistory {
    /// Open (creating if absent) the history file at `path`, seeding the
    /// sequence counter from however many records already exist.
    pub async fn open(path: impl Into<PathBuf>) -> OrganizeResult<Self> {
        let path = path.into();
        let existing = tokio::fs::read_to_string(&path).await.unwrap_or_default();
        let next_sequence = existing.lines().filter(|l| !l.trim().is_empty()).count() as u64;
        Ok(Self {
            path,
            next_sequence: AtomicU64::new(next_sequence),
            write_lock: Mutex::new(()),
        })
    }

    /// Append one record, assigning it the next sequence number.
    pub async fn append(&self, mut record: FileOperationRecord) -> OrganizeResult<FileOperationRecord> {
        let _guard = self.write_lock.lock().await;
        record.sequence = self.next_sequence.fetch_add(1, Ordering::SeqCst);

        let line = serde_json::to_string(&record)?;
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).await?;
        file.write_all(line.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.flush().await?;

        Ok(record)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
