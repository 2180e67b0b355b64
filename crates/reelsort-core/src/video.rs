//! Video and frame models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Probed metadata for a source video file.
///
/// Immutable once produced by the media reader. `checksum` is a strong
/// content hash (SHA-256 hex) used as a component of cache keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Video {
    pub path: String,
    pub byte_len: u64,
    pub duration_seconds: f64,
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    pub checksum: String,
}

impl Video {
    /// Total frame count implied by `duration_seconds * fps`, rounded down.
    ///
    /// This is the canonical `totalFrames` referenced throughout the
    /// segment-building and boundary invariants.
    pub fn total_frames(&self) -> u64 {
        (self.duration_seconds * self.fps).floor().max(0.0) as u64
    }
}

/// A single decoded frame.
///
/// Frames are produced lazily by the media reader and never retained
/// beyond a detector's sliding window.
#[derive(Debug, Clone)]
pub struct Frame {
    pub index: u64,
    pub timestamp_seconds: f64,
    /// Row-major luma (grayscale) pixel buffer, `width * height` bytes.
    pub luma: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub fn new(index: u64, fps: f64, luma: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            index,
            timestamp_seconds: index as f64 / fps,
            luma,
            width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_frames_rounds_down() {
        let v = Video {
            path: "x.mp4".into(),
            byte_len: 0,
            duration_seconds: 6.05,
            fps: 10.0,
            width: 640,
            height: 480,
            checksum: "abc".into(),
        };
        assert_eq!(v.total_frames(), 60);
    }

    #[test]
    fn frame_timestamp_derives_from_index_and_fps() {
        let f = Frame::new(30, 10.0, vec![], 1, 1);
        assert!((f.timestamp_seconds - 3.0).abs() < f64::EPSILON);
    }
}
