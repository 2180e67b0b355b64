//! Error types for media reading, detection, fusion, and segmentation.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while probing or decoding media (C1) or running
/// a detector (C2).
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("ffmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("ffprobe not found in PATH")]
    FfprobeNotFound,

    #[error("ffmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("ffprobe command failed: {message}")]
    FfprobeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("unreadable media: {0}")]
    UnreadableMedia(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("invalid video file: {0}")]
    InvalidVideo(String),

    #[error("detector '{name}' failed: {message}")]
    DetectionFailed { name: String, message: String },

    #[error("detector unavailable: {0}")]
    DetectorUnavailable(String),

    #[error("all detectors failed")]
    AllDetectorsFailed,
}

impl MediaError {
    pub fn ffmpeg_failed(message: impl Into<String>, stderr: Option<String>, exit_code: Option<i32>) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    pub fn detection_failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DetectionFailed {
            name: name.into(),
            message: message.into(),
        }
    }
}
