//! Consecutive-frame luma difference detector.

use async_trait::async_trait;
use rayon::prelude::*;
use reelsort_core::{BoundaryCandidate, Frame};
use tracing::debug;

use crate::error::MediaResult;
use super::{trailing_stats, Detector, ProgressSink};

const TAG: &str = "frame-difference";

/// Compares consecutive frames' luma buffers with normalized mean absolute
/// difference. Emits a candidate when the difference exceeds `threshold`
/// (or an adaptive `mean + k*stddev` threshold) and the distance to the
/// previous emission is at least `min_shot_frames`.
#[derive(Debug, Clone)]
pub struct FrameDifference {
    pub threshold: f64,
    pub min_shot_frames: u64,
    pub adaptive: bool,
    /// `k` in `mean + k*stddev`, only used when `adaptive` is set.
    pub adaptive_k: f64,
    /// Trailing window size (in frames) used for the adaptive threshold.
    pub adaptive_window: usize,
}

impl Default for FrameDifference {
    fn default() -> Self {
        Self {
            threshold: 0.3,
            min_shot_frames: 30,
            adaptive: false,
            adaptive_k: 2.0,
            adaptive_window: 30,
        }
    }
}

impl FrameDifference {
    /// Normalized mean absolute difference in luma between two
    /// equal-sized frames, in `[0, 1]`.
    fn nmad(a: &Frame, b: &Frame) -> f64 {
        if a.luma.is_empty() || a.luma.len() != b.luma.len() {
            return 0.0;
        }
        let sum: u64 = a
            .luma
            .iter()
            .zip(b.luma.iter())
            .map(|(x, y)| (*x as i32 - *y as i32).unsigned_abs() as u64)
            .sum();
        (sum as f64) / (a.luma.len() as f64) / 255.0
    }
}

#[async_trait]
impl Detector for FrameDifference {
    fn tag(&self) -> &'static str {
        TAG
    }

    async fn detect_boundaries(
        &self,
        frames: &[Frame],
        progress: &ProgressSink,
    ) -> MediaResult<Vec<BoundaryCandidate>> {
        let mut candidates = Vec::new();
        if frames.len() < 2 {
            progress(1.0);
            return Ok(candidates);
        }

        // Each pair's difference is independent of the others; only the
        // adaptive-threshold/spacing decision below is sequential.
        let diffs: Vec<f64> = frames.par_windows(2).map(|pair| Self::nmad(&pair[0], &pair[1])).collect();

        let mut trailing: Vec<f64> = Vec::with_capacity(self.adaptive_window);
        let mut last_emission: Option<u64> = None;
        let total = (frames.len() - 1) as f64;

        for (i, pair) in frames.windows(2).enumerate() {
            let diff = diffs[i];

            let effective_threshold = if self.adaptive && !trailing.is_empty() {
                let (mean, stddev) = trailing_stats(&trailing);
                mean + self.adaptive_k * stddev
            } else {
                self.threshold
            };

            let spacing_ok = match last_emission {
                Some(prev) => pair[1].index.saturating_sub(prev) >= self.min_shot_frames,
                None => true,
            };

            if diff > effective_threshold && spacing_ok {
                candidates.push(BoundaryCandidate {
                    frame_index: pair[1].index,
                    algorithm_tag: TAG.to_string(),
                    score: diff.min(1.0),
                });
                last_emission = Some(pair[1].index);
            }

            trailing.push(diff);
            if trailing.len() > self.adaptive_window {
                trailing.remove(0);
            }

            progress((i as f64 + 1.0) / total);
        }

        debug!(count = candidates.len(), "frame-difference candidates emitted");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(index: u64, value: u8) -> Frame {
        Frame::new(index, 10.0, vec![value; 100], 10, 10)
    }

    #[tokio::test]
    async fn emits_one_candidate_on_hard_cut() {
        let mut frames: Vec<Frame> = (0..30).map(|i| frame(i, 0)).collect();
        frames.extend((30..60).map(|i| frame(i, 255)));

        let detector = FrameDifference {
            threshold: 0.3,
            min_shot_frames: 3,
            ..Default::default()
        };
        let sink: ProgressSink = Box::new(|_| {});
        let candidates = detector.detect_boundaries(&frames, &sink).await.unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].frame_index, 30);
        assert!(candidates[0].score > 0.9);
    }

    #[tokio::test]
    async fn respects_min_shot_frames_spacing() {
        let frames: Vec<Frame> = vec![
            frame(0, 0),
            frame(1, 255),
            frame(2, 0),
            frame(3, 255),
        ];
        let detector = FrameDifference {
            threshold: 0.3,
            min_shot_frames: 10,
            ..Default::default()
        };
        let sink: ProgressSink = Box::new(|_| {});
        let candidates = detector.detect_boundaries(&frames, &sink).await.unwrap();
        assert_eq!(candidates.len(), 1);
    }

    #[tokio::test]
    async fn empty_input_yields_no_candidates() {
        let detector = FrameDifference::default();
        let sink: ProgressSink = Box::new(|_| {});
        let candidates = detector.detect_boundaries(&[], &sink).await.unwrap();
        assert!(candidates.is_empty());
    }
}
