//! Video probing, frame decoding, shot-boundary detection, fusion, and
//! segment building.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building and progress parsing
//! - Video/frame probing and restartable decoding (C1)
//! - Shot-boundary detectors (C2)
//! - The weighted-fusion engine (C3)
//! - The segment builder (C4)

pub mod command;
pub mod detectors;
pub mod error;
pub mod fusion;
pub mod probe;
pub mod progress;
pub mod reader;
pub mod segment_builder;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use detectors::{ColorSpace, Detector, DistanceMetric, FrameDifference, Histogram, OpticalFlowStub, ProgressSink};
pub use error::{MediaError, MediaResult};
pub use fusion::{fuse, FusionConfig};
pub use probe::{checksum_file, probe_video};
pub use progress::{FfmpegProgress, ProgressCallback};
pub use reader::{DecodeSize, MediaReader};
pub use segment_builder::{build_segments, BoundaryMarker, OversizedPolicy, SegmentBuilderConfig};
