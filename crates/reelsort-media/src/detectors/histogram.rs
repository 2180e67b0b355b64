//! Luma-histogram distance detector.
//!
//! The media reader (C1) only decodes grayscale luma buffers, so this
//! detector's histograms are single-channel. `ColorSpace` is still exposed
//! for configuration parity with the spec's RGB/HSV/LAB knob; only
//! `ColorSpace::Luma` changes behavior today. Wiring RGB/HSV/LAB through
//! means changing the reader's decode pipeline to emit full-color frames,
//! which is out of scope for this crate's current decode path.

use async_trait::async_trait;
use rayon::prelude::*;
use reelsort_core::{BoundaryCandidate, Frame};
use tracing::debug;

use crate::error::MediaResult;
use super::{trailing_stats, Detector, ProgressSink};

const TAG: &str = "histogram";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Luma,
    Rgb,
    Hsv,
    Lab,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistanceMetric {
    Correlation,
    ChiSquare,
    Intersection,
}

#[derive(Debug, Clone)]
pub struct Histogram {
    pub bins: u32,
    pub color_space: ColorSpace,
    pub distance: DistanceMetric,
    pub threshold: f64,
    pub adaptive: bool,
    pub adaptive_k: f64,
    pub adaptive_window: usize,
    pub min_shot_frames: u64,
}

impl Default for Histogram {
    fn default() -> Self {
        Self {
            bins: 256,
            color_space: ColorSpace::Luma,
            distance: DistanceMetric::Correlation,
            threshold: 0.3,
            adaptive: false,
            adaptive_k: 2.0,
            adaptive_window: 30,
            min_shot_frames: 30,
        }
    }
}

impl Histogram {
    fn histogram(&self, frame: &Frame) -> Vec<f64> {
        let mut hist = vec![0.0f64; self.bins as usize];
        let scale = self.bins as f64 / 256.0;
        for &p in &frame.luma {
            let bucket = ((p as f64 * scale) as usize).min(self.bins as usize - 1);
            hist[bucket] += 1.0;
        }
        let total: f64 = hist.iter().sum();
        if total > 0.0 {
            for v in hist.iter_mut() {
                *v /= total;
            }
        }
        hist
    }

    /// Returns a dissimilarity score in `[0, 1]`: 0 means identical
    /// histograms, 1 means maximally different, regardless of metric.
    fn distance(&self, a: &[f64], b: &[f64]) -> f64 {
        match self.distance {
            DistanceMetric::Correlation => {
                let mean_a = a.iter().sum::<f64>() / a.len() as f64;
                let mean_b = b.iter().sum::<f64>() / b.len() as f64;
                let mut num = 0.0;
                let mut den_a = 0.0;
                let mut den_b = 0.0;
                for (x, y) in a.iter().zip(b.iter()) {
                    let da = x - mean_a;
                    let db = y - mean_b;
                    num += da * db;
                    den_a += da * da;
                    den_b += db * db;
                }
                let denom = (den_a * den_b).sqrt();
                let correlation = if denom > 0.0 { num / denom } else { 1.0 };
                ((1.0 - correlation) / 2.0).clamp(0.0, 1.0)
            }
            DistanceMetric::ChiSquare => {
                let mut sum = 0.0;
                for (x, y) in a.iter().zip(b.iter()) {
                    let denom = x + y;
                    if denom > 0.0 {
                        sum += (x - y).powi(2) / denom;
                    }
                }
                (sum / 2.0).clamp(0.0, 1.0)
            }
            DistanceMetric::Intersection => {
                let overlap: f64 = a.iter().zip(b.iter()).map(|(x, y)| x.min(*y)).sum();
                (1.0 - overlap).clamp(0.0, 1.0)
            }
        }
    }
}

#[async_trait]
impl Detector for Histogram {
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

        // Each frame's histogram is independent of its neighbors; only
        // the distance/adaptive-threshold pass below is sequential.
        let histograms: Vec<Vec<f64>> = frames.par_iter().map(|f| self.histogram(f)).collect();
        let mut trailing: Vec<f64> = Vec::with_capacity(self.adaptive_window);
        let mut last_emission: Option<u64> = None;
        let total = (frames.len() - 1) as f64;

        for i in 0..frames.len() - 1 {
            let dist = self.distance(&histograms[i], &histograms[i + 1]);

            let effective_threshold = if self.adaptive && !trailing.is_empty() {
                let (mean, stddev) = trailing_stats(&trailing);
                mean + self.adaptive_k * stddev
            } else {
                self.threshold
            };

            let next_index = frames[i + 1].index;
            let spacing_ok = match last_emission {
                Some(prev) => next_index.saturating_sub(prev) >= self.min_shot_frames,
                None => true,
            };

            if dist > effective_threshold && spacing_ok {
                candidates.push(BoundaryCandidate {
                    frame_index: next_index,
                    algorithm_tag: TAG.to_string(),
                    score: dist.min(1.0),
                });
                last_emission = Some(next_index);
            }

            trailing.push(dist);
            if trailing.len() > self.adaptive_window {
                trailing.remove(0);
            }

            progress((i as f64 + 1.0) / total);
        }

        debug!(count = candidates.len(), "histogram candidates emitted");
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(index: u64, value: u8) -> Frame {
        Frame::new(index, 10.0, vec![value; 64], 8, 8)
    }

    #[tokio::test]
    async fn detects_gradual_fade_within_expected_range() {
        let mut frames = Vec::new();
        for i in 0..30u64 {
            let value = if i < 10 {
                0
            } else if i > 20 {
                255
            } else {
                (((i - 10) as f64 / 10.0) * 255.0) as u8
            };
            frames.push(frame(i, value));
        }

        let detector = Histogram {
            adaptive: true,
            bins: 64,
            distance: DistanceMetric::Correlation,
            min_shot_frames: 1,
            ..Default::default()
        };
        let sink: ProgressSink = Box::new(|_| {});
        let candidates = detector.detect_boundaries(&frames, &sink).await.unwrap();

        assert!(!candidates.is_empty());
        for c in &candidates {
            assert!(c.frame_index >= 9 && c.frame_index <= 21);
        }
    }

    #[test]
    fn identical_frames_have_zero_distance() {
        let h = Histogram::default();
        let a = h.histogram(&frame(0, 128));
        let b = h.histogram(&frame(1, 128));
        assert!(h.distance(&a, &b) < 1e-9);
    }
}
