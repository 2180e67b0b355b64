//! Segment model: a half-open frame range between two boundaries.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A flag recording why a segment's duration fell outside the configured
/// bounds, or how it was reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilterFlag {
    /// Duration exceeded `maxDuration` and the `keep-flagged` policy applied.
    Oversized,
    /// This segment absorbed a shorter neighbor during min-duration merging.
    MergedNeighbor,
}

/// A contiguous, half-open frame range belonging to one video.
///
/// Segments of one video are non-overlapping, ordered by `start_frame`,
/// and their union covers `[0, totalFrames)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Segment {
    /// Stable id: `hash(videoChecksum, startFrame, endFrame)`.
    pub id: String,
    pub start_frame: u64,
    /// Exclusive.
    pub end_frame: u64,
    pub start_time: f64,
    pub end_time: f64,
    pub duration_seconds: f64,
    pub source_video_checksum: String,
    pub filter_flags: Vec<FilterFlag>,
}

impl Segment {
    pub fn new(
        source_video_checksum: &str,
        start_frame: u64,
        end_frame: u64,
        fps: f64,
        filter_flags: Vec<FilterFlag>,
    ) -> Self {
        let start_time = start_frame as f64 / fps;
        let end_time = end_frame as f64 / fps;
        Self {
            id: segment_id(source_video_checksum, start_frame, end_frame),
            start_frame,
            end_frame,
            start_time,
            end_time,
            duration_seconds: end_time - start_time,
            source_video_checksum: source_video_checksum.to_string(),
            filter_flags,
        }
    }
}

/// Derive the stable segment id per spec: `hash(videoChecksum, startFrame, endFrame)`.
pub fn segment_id(video_checksum: &str, start_frame: u64, end_frame: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(video_checksum.as_bytes());
    hasher.update(start_frame.to_le_bytes());
    hasher.update(end_frame.to_le_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_is_stable_for_same_inputs() {
        let a = segment_id("abc", 0, 30);
        let b = segment_id("abc", 0, 30);
        assert_eq!(a, b);
    }

    #[test]
    fn id_differs_on_range_change() {
        let a = segment_id("abc", 0, 30);
        let b = segment_id("abc", 0, 31);
        assert_ne!(a, b);
    }

    #[test]
    fn invariants_hold() {
        let seg = Segment::new("abc", 0, 30, 10.0, vec![]);
        assert!(seg.start_frame < seg.end_frame);
        assert!((seg.duration_seconds - 3.0).abs() < 1e-9);
    }
}
