//! Workflow engine configuration.

use std::path::PathBuf;

use reelsort_core::{ConflictPolicy, NamingMode};
use reelsort_media::{DecodeSize, FusionConfig, SegmentBuilderConfig};
use reelsort_organize::OrganizeConfig;

/// Top-level configuration for one workflow run.
#[derive(Clone)]
pub struct WorkflowConfig {
    /// Maximum number of videos processed concurrently.
    pub concurrency: usize,
    pub decode_size: DecodeSize,
    pub fusion: FusionConfig,
    pub segment_builder: SegmentBuilderConfig,
    /// Directory backing the content-addressed cache store (C5).
    pub cache_dir: PathBuf,
    /// Root under which the folder matcher scans for destination folders.
    pub destination_root: PathBuf,
    pub organize: OrganizeConfig,
    pub min_match_confidence: f64,
    pub max_matches: usize,
}

impl WorkflowConfig {
    /// Build config from environment variables, matching the
    /// `REELSORT_*` convention used across the binary's other crates.
    pub fn from_env() -> Self {
        Self {
            concurrency: std::env::var("REELSORT_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
            decode_size: DecodeSize::default(),
            fusion: FusionConfig::default(),
            segment_builder: SegmentBuilderConfig::default(),
            cache_dir: std::env::var("REELSORT_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/tmp/reelsort-cache")),
            destination_root: std::env::var("REELSORT_DESTINATION_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            organize: OrganizeConfig {
                naming_mode: NamingMode::Smart,
                conflict_policy: ConflictPolicy::Rename,
                ..OrganizeConfig::default()
            },
            min_match_confidence: 0.0,
            max_matches: 10,
        }
    }
}
