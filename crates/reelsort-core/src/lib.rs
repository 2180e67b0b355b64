//! Shared data models for the reelsort video understanding pipeline.
//!
//! This crate provides serde-serializable types for:
//! - Probed video and frame metadata (C1)
//! - Boundary candidates and fused boundaries (C2/C3)
//! - Segments (C4)
//! - Analysis results (C7)
//! - Folder candidates and match results (C8)
//! - Cache entries (C5)
//! - File operation records (C9)
//! - Workflow progress events (C10)
//!
//! All wire-facing documents carry a top-level `schema_version` field,
//! bumped whenever a breaking shape change ships.

pub mod analysis;
pub mod boundary;
pub mod cache_entry;
pub mod file_operation;
pub mod folder;
pub mod match_result;
pub mod progress;
pub mod segment;
pub mod video;

pub use analysis::{AnalysisResult, ObjectEntry, QualityMetrics, SceneEntry, Summary};
pub use boundary::{Boundary, BoundaryCandidate};
pub use cache_entry::{CacheEntry, CacheLookup, CacheMetadata};
pub use file_operation::{ConflictPolicy, FileOp, FileOperationRecord, NamingMode};
pub use folder::FolderCandidate;
pub use match_result::{Action, MatchResult};
pub use progress::{AnalysisProgress, WorkflowPhase, WorkflowProgress};
pub use segment::{segment_id, FilterFlag, Segment};
pub use video::{Frame, Video};

/// Monotonically increasing schema version for all stable JSON shapes.
pub const SCHEMA_VERSION: u32 = 1;
