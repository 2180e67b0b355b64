//! Cache entry model shared by the cache store (C5).

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Sidecar metadata persisted alongside a cached payload.
///
/// A lookup only returns `Hit` when `now < expires_at`,
/// `stored_input_checksum == current_input_checksum`, and
/// `payload_version` matches the current code version.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheMetadata {
    pub input_checksum: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub payload_version: u32,
}

/// A cache entry: the metadata plus the opaque JSON payload.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: String,
    pub payload: serde_json::Value,
    pub metadata: CacheMetadata,
}

/// Result of a cache lookup.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    Hit(serde_json::Value),
    Miss,
}

impl CacheLookup {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheLookup::Hit(_))
    }
}
