//! Destination folder candidates discovered by the folder matcher (C8).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A discovered destination directory under the configured scan root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FolderCandidate {
    pub absolute_path: String,
    pub display_name: String,
    pub depth: usize,
}
