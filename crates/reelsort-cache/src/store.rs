//! Local filesystem content-addressed cache store (C5).
//!
//! Re-targeted from the teacher's R2/S3 object client to a local cache
//! root, since this core has no network object-store component. Keeps the
//! teacher's key-based access pattern (`client.rs`'s `upload_bytes` /
//! `download_bytes` shape) and its version-gating discipline
//! (`neural_cache.rs`'s `is_current_version` check), but persists to
//! `<cache-root>/<key>.json` + `<key>.meta.json` instead of R2 objects.
//! Writes go to a `.tmp` file before an atomic rename, matching
//! `vclip-media::fs_utils::move_file`'s atomicity discipline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use dashmap::DashMap;
use reelsort_core::{CacheEntry, CacheLookup, CacheMetadata};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};

/// A scoped handle on a cache root directory.
///
/// Cloning is cheap: the per-key lock table is shared via `Arc`, matching
/// the concurrent-critical-section need the teacher addresses with
/// advisory locking in its queue consumer.
#[derive(Clone)]
pub struct CacheStore {
    root: PathBuf,
    payload_version: u32,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl CacheStore {
    /// Open (creating if necessary) a cache store rooted at `root`.
    /// `payload_version` is the current code version; entries written by
    /// an older version are treated as misses and swept on access.
    pub async fn open(root: impl Into<PathBuf>, payload_version: u32) -> CacheResult<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            payload_version,
            locks: Arc::new(DashMap::new()),
        })
    }

    fn payload_path(&self, key: &str) -> CacheResult<PathBuf> {
        Ok(self.root.join(format!("{}.json", validate_key(key)?)))
    }

    fn meta_path(&self, key: &str) -> CacheResult<PathBuf> {
        Ok(self.root.join(format!("{}.meta.json", validate_key(key)?)))
    }

    fn lock_for(&self, key: &str) -> Arc<Mutex<()>> {
        self.locks.entry(key.to_string()).or_insert_with(|| Arc::new(Mutex::new(()))).clone()
    }

    /// Look up `key`, validating it against `current_input_checksum`.
    ///
    /// Returns `Miss` (never an error) for a missing, expired,
    /// checksum-stale, version-stale, or corrupt entry. Corrupt or stale
    /// entries are deleted as part of the lookup. Readers never block
    /// writers: no lock is taken here, so a concurrent `put` may race a
    /// `lookup` and the reader simply sees whichever state won.
    pub async fn lookup(&self, key: &str, current_input_checksum: &str) -> CacheResult<CacheLookup> {
        let payload_path = self.payload_path(key)?;
        let meta_path = self.meta_path(key)?;

        let meta_bytes = match tokio::fs::read(&meta_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CacheLookup::Miss),
            Err(e) => return Err(e.into()),
        };

        let metadata: CacheMetadata = match serde_json::from_slice(&meta_bytes) {
            Ok(m) => m,
            Err(e) => {
                warn!(key, error = %e, "corrupt cache metadata, evicting");
                self.remove_files(&payload_path, &meta_path).await;
                return Ok(CacheLookup::Miss);
            }
        };

        if Utc::now() >= metadata.expires_at {
            debug!(key, "cache entry expired");
            self.remove_files(&payload_path, &meta_path).await;
            return Ok(CacheLookup::Miss);
        }
        if metadata.input_checksum != current_input_checksum {
            debug!(key, "cache entry stale (input checksum changed)");
            self.remove_files(&payload_path, &meta_path).await;
            return Ok(CacheLookup::Miss);
        }
        if metadata.payload_version != self.payload_version {
            debug!(key, "cache entry stale (payload version changed)");
            self.remove_files(&payload_path, &meta_path).await;
            return Ok(CacheLookup::Miss);
        }

        let payload_bytes = match tokio::fs::read(&payload_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(CacheLookup::Miss),
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&payload_bytes) {
            Ok(value) => {
                debug!(key, "cache hit");
                Ok(CacheLookup::Hit(value))
            }
            Err(e) => {
                warn!(key, error = %e, "corrupt cache payload, evicting");
                self.remove_files(&payload_path, &meta_path).await;
                Ok(CacheLookup::Miss)
            }
        }
    }

    /// Write `payload` under `key` with a TTL, gated on `input_checksum`.
    /// Concurrent writers to the same key serialize on a per-key lock;
    /// the write itself is atomic (temp file + rename).
    pub async fn put(
        &self,
        key: &str,
        payload: &serde_json::Value,
        input_checksum: &str,
        ttl: ChronoDuration,
    ) -> CacheResult<()> {
        let lock = self.lock_for(key);
        let _guard = lock.lock().await;

        let payload_path = self.payload_path(key)?;
        let meta_path = self.meta_path(key)?;

        let now: DateTime<Utc> = Utc::now();
        let metadata = CacheMetadata {
            input_checksum: input_checksum.to_string(),
            created_at: now,
            expires_at: now + ttl,
            payload_version: self.payload_version,
        };

        write_atomic(&payload_path, serde_json::to_vec_pretty(payload)?).await?;
        write_atomic(&meta_path, serde_json::to_vec_pretty(&metadata)?).await?;

        debug!(key, expires_at = %metadata.expires_at, "cache entry written");
        Ok(())
    }

    /// Remove any entry for `key`, regardless of its current state.
    pub async fn invalidate(&self, key: &str) -> CacheResult<()> {
        let payload_path = self.payload_path(key)?;
        let meta_path = self.meta_path(key)?;
        self.remove_files(&payload_path, &meta_path).await;
        Ok(())
    }

    /// Walk the cache root and delete every entry whose metadata has
    /// expired. Returns the number of entries swept.
    pub async fn sweep_expired(&self) -> CacheResult<u64> {
        let mut swept = 0u64;
        let mut entries = tokio::fs::read_dir(&self.root).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.ends_with(".meta.json") {
                continue;
            }

            let bytes = match tokio::fs::read(&path).await {
                Ok(b) => b,
                Err(_) => continue,
            };
            let metadata: CacheMetadata = match serde_json::from_slice(&bytes) {
                Ok(m) => m,
                Err(_) => {
                    let _ = tokio::fs::remove_file(&path).await;
                    swept += 1;
                    continue;
                }
            };

            if Utc::now() >= metadata.expires_at {
                let key = name.trim_end_matches(".meta.json");
                let payload_path = self.root.join(format!("{}.json", key));
                self.remove_files(&payload_path, &path).await;
                swept += 1;
            }
        }

        debug!(swept, "sweep_expired complete");
        Ok(swept)
    }

    /// Load a full `CacheEntry` for `key` without checksum/version
    /// gating, primarily for diagnostics and tests.
    pub async fn entry(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        let payload_path = self.payload_path(key)?;
        let meta_path = self.meta_path(key)?;

        let meta_bytes = match tokio::fs::read(&meta_path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let payload_bytes = tokio::fs::read(&payload_path).await?;

        Ok(Some(CacheEntry {
            key: key.to_string(),
            payload: serde_json::from_slice(&payload_bytes)?,
            metadata: serde_json::from_slice(&meta_bytes)?,
        }))
    }

    async fn remove_files(&self, payload_path: &Path, meta_path: &Path) {
        let _ = tokio::fs::remove_file(payload_path).await;
        let _ = tokio::fs::remove_file(meta_path).await;
    }
}

/// Cache keys become filenames; reject anything that could escape the
/// cache root or collide with the `.meta.json` sidecar suffix.
fn validate_key(key: &str) -> CacheResult<&str> {
    if key.is_empty() || key.contains('/') || key.contains('\\') || key.contains("..") {
        return Err(CacheError::InvalidKey(key.to_string()));
    }
    Ok(key)
}

async fn write_atomic(path: &Path, bytes: Vec<u8>) -> CacheResult<()> {
    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, &bytes).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store() -> (CacheStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::open(dir.path(), 1).await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn miss_on_unknown_key() {
        let (store, _dir) = store().await;
        let result = store.lookup("nope", "chk").await.unwrap();
        assert!(!result.is_hit());
    }

    #[tokio::test]
    async fn put_then_lookup_is_a_hit() {
        let (store, _dir) = store().await;
        store
            .put("k1", &json!({"a": 1}), "chk", ChronoDuration::seconds(60))
            .await
            .unwrap();

        let result = store.lookup("k1", "chk").await.unwrap();
        assert!(result.is_hit());
    }

    #[tokio::test]
    async fn checksum_mismatch_is_a_miss() {
        let (store, _dir) = store().await;
        store
            .put("k1", &json!({"a": 1}), "chk-a", ChronoDuration::seconds(60))
            .await
            .unwrap();

        let result = store.lookup("k1", "chk-b").await.unwrap();
        assert!(!result.is_hit());
    }

    #[tokio::test]
    async fn expired_entry_is_a_miss_and_is_evicted() {
        let (store, _dir) = store().await;
        store
            .put("k1", &json!({"a": 1}), "chk", ChronoDuration::seconds(-1))
            .await
            .unwrap();

        let result = store.lookup("k1", "chk").await.unwrap();
        assert!(!result.is_hit());
        assert!(store.entry("k1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn payload_version_mismatch_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store_v1 = CacheStore::open(dir.path(), 1).await.unwrap();
        store_v1
            .put("k1", &json!({"a": 1}), "chk", ChronoDuration::seconds(60))
            .await
            .unwrap();

        let store_v2 = CacheStore::open(dir.path(), 2).await.unwrap();
        let result = store_v2.lookup("k1", "chk").await.unwrap();
        assert!(!result.is_hit());
    }

    #[tokio::test]
    async fn corrupt_payload_is_evicted_on_access() {
        let (store, dir) = store().await;
        store
            .put("k1", &json!({"a": 1}), "chk", ChronoDuration::seconds(60))
            .await
            .unwrap();

        tokio::fs::write(dir.path().join("k1.json"), b"not json").await.unwrap();

        let result = store.lookup("k1", "chk").await.unwrap();
        assert!(!result.is_hit());
        assert!(!dir.path().join("k1.json").exists());
    }

    #[tokio::test]
    async fn invalidate_removes_entry() {
        let (store, dir) = store().await;
        store
            .put("k1", &json!({"a": 1}), "chk", ChronoDuration::seconds(60))
            .await
            .unwrap();
        store.invalidate("k1").await.unwrap();
        assert!(!dir.path().join("k1.json").exists());
    }

    #[tokio::test]
    async fn sweep_expired_removes_only_expired_entries() {
        let (store, _dir) = store().await;
        store
            .put("fresh", &json!({"a": 1}), "chk", ChronoDuration::seconds(60))
            .await
            .unwrap();
        store
            .put("stale", &json!({"a": 1}), "chk", ChronoDuration::seconds(-1))
            .await
            .unwrap();

        let swept = store.sweep_expired().await.unwrap();
        assert_eq!(swept, 1);
        assert!(store.entry("fresh").await.unwrap().is_some());
        assert!(store.entry("stale").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_path_traversal_keys() {
        let (store, _dir) = store().await;
        let err = store.lookup("../escape", "chk").await.unwrap_err();
        assert!(matches!(err, CacheError::InvalidKey(_)));
    }
}
