//! Shot boundary candidates and fused boundaries.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A candidate boundary emitted by a single detector, before fusion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundaryCandidate {
    pub frame_index: u64,
    pub algorithm_tag: String,
    /// Normalized confidence in `[0, 1]`.
    pub score: f64,
}

/// A fused shot boundary, the output of the fusion engine.
///
/// Two `BoundaryCandidate`s whose frame indices are within
/// `clusterTolerance` of each other collapse into one `Boundary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Boundary {
    pub frame_index: u64,
    pub timestamp_seconds: f64,
    /// Weighted confidence in `[0, 1]`.
    pub confidence: f64,
    pub contributing_algorithms: BTreeSet<String>,
}

impl Boundary {
    pub fn new(frame_index: u64, fps: f64, confidence: f64, contributing: BTreeSet<String>) -> Self {
        Self {
            frame_index,
            timestamp_seconds: frame_index as f64 / fps,
            confidence,
            contributing_algorithms: contributing,
        }
    }
}
