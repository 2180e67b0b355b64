//! File operation records produced by the file organizer (C9).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;

/// The operation actually performed, as distinct from the action that was
/// requested — a `move` that degrades to `skip` on conflict must say so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FileOp {
    Move,
    Copy,
    Skip,
}

/// Destination filename generation strategy (spec.md 4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum NamingMode {
    PreserveOriginal,
    Smart,
    ContentBased,
    Timestamp,
    Custom,
}

/// What to do when the generated destination path already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    Skip,
    Overwrite,
    Rename,
}

/// The durable, append-only record of one organize operation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileOperationRecord {
    pub schema_version: u32,
    /// Monotonic sequence number within the append-only history.
    pub sequence: u64,
    pub original_path: String,
    pub new_path: String,
    pub op: FileOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backup_path: Option<String>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
