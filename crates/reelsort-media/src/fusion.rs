//! Fusion engine (C3): combines detector candidates into fused Boundaries.
//!
//! Pure and synchronous by construction — no I/O, no async, so the
//! determinism law ("same candidates and weights -> byte-identical
//! output") is straightforward to hold and to test.

use std::collections::{BTreeMap, BTreeSet};

use reelsort_core::{Boundary, BoundaryCandidate};
use tracing::debug;

/// Per-detector weight, config-driven. Weights are normalized internally
/// and are not required to sum to 1.
#[derive(Debug, Clone)]
pub struct FusionConfig {
    pub weights: BTreeMap<String, f64>,
    pub cluster_tolerance: u64,
    pub fusion_threshold: f64,
    pub min_detectors: usize,
    pub min_shot_frames: u64,
    pub fps: f64,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            weights: BTreeMap::new(),
            cluster_tolerance: 5,
            fusion_threshold: 0.6,
            min_detectors: 1,
            min_shot_frames: 30,
            fps: 30.0,
        }
    }
}

impl FusionConfig {
    fn weight_for(&self, tag: &str) -> f64 {
        self.weights.get(tag).copied().unwrap_or(1.0)
    }
}

struct Bucket {
    anchor_frame: u64,
    members: Vec<BoundaryCandidate>,
}

/// Fuse per-detector candidates (already normalized to `[0, 1]` scores by
/// their producing detector) into a sorted sequence of `Boundary`.
///
/// Steps, per spec: bucket by frame-index tolerance, weight-average each
/// bucket's score, threshold-and-min-detector-filter, then suppress
/// buckets that cluster within `min_shot_frames` of a stronger bucket.
pub fn fuse(mut candidates: Vec<BoundaryCandidate>, config: &FusionConfig) -> Vec<Boundary> {
    candidates.sort_by(|a, b| {
        a.frame_index
            .cmp(&b.frame_index)
            .then_with(|| a.algorithm_tag.cmp(&b.algorithm_tag))
    });

    let buckets = bucket_candidates(&candidates, config.cluster_tolerance);

    let mut scored: Vec<(u64, f64, BTreeSet<String>)> = buckets
        .into_iter()
        .filter_map(|bucket| score_bucket(&bucket, config))
        .collect();

    scored.sort_by(|a, b| {
        a.0.cmp(&b.0)
            .then_with(|| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal))
    });

    let deduped = suppress_near_duplicates(scored, config.min_shot_frames);

    deduped
        .into_iter()
        .map(|(frame_index, confidence, tags)| Boundary::new(frame_index, config.fps, confidence, tags))
        .collect()
}

fn bucket_candidates(candidates: &[BoundaryCandidate], tolerance: u64) -> Vec<Bucket> {
    let mut buckets: Vec<Bucket> = Vec::new();
    for candidate in candidates {
        if let Some(bucket) = buckets
            .iter_mut()
            .find(|b| candidate.frame_index.abs_diff(b.anchor_frame) <= tolerance)
        {
            bucket.members.push(candidate.clone());
        } else {
            buckets.push(Bucket {
                anchor_frame: candidate.frame_index,
                members: vec![candidate.clone()],
            });
        }
    }
    buckets
}

fn score_bucket(bucket: &Bucket, config: &FusionConfig) -> Option<(u64, f64, BTreeSet<String>)> {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    let mut tags = BTreeSet::new();
    let mut frame_index = bucket.anchor_frame;

    for candidate in &bucket.members {
        let weight = config.weight_for(&candidate.algorithm_tag);
        weighted_sum += weight * candidate.score.clamp(0.0, 1.0);
        weight_total += weight;
        tags.insert(candidate.algorithm_tag.clone());
        frame_index = frame_index.min(candidate.frame_index);
    }

    if weight_total <= 0.0 {
        return None;
    }

    let confidence = weighted_sum / weight_total;
    if confidence >= config.fusion_threshold && tags.len() >= config.min_detectors {
        debug!(frame_index, confidence, detectors = tags.len(), "bucket accepted");
        Some((frame_index, confidence, tags))
    } else {
        None
    }
}

/// Within any `min_shot_frames` run, keep only the highest-confidence
/// bucket; break ties by earliest frame index, then lexicographic tag set.
fn suppress_near_duplicates(
    scored: Vec<(u64, f64, BTreeSet<String>)>,
    min_shot_frames: u64,
) -> Vec<(u64, f64, BTreeSet<String>)> {
    let mut result: Vec<(u64, f64, BTreeSet<String>)> = Vec::new();

    for entry in scored {
        if let Some(last) = result.last_mut() {
            if entry.0.saturating_sub(last.0) < min_shot_frames {
                let replace = match entry.1.partial_cmp(&last.1) {
                    Some(std::cmp::Ordering::Greater) => true,
                    Some(std::cmp::Ordering::Equal) => {
                        entry.0 < last.0 || (entry.0 == last.0 && entry.2 < last.2)
                    }
                    _ => false,
                };
                if replace {
                    *last = entry;
                }
                continue;
            }
        }
        result.push(entry);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(frame_index: u64, tag: &str, score: f64) -> BoundaryCandidate {
        BoundaryCandidate {
            frame_index,
            algorithm_tag: tag.to_string(),
            score,
        }
    }

    #[test]
    fn fusion_is_deterministic_across_runs() {
        let candidates = vec![
            candidate(30, "frame-difference", 0.9),
            candidate(31, "histogram", 0.8),
        ];
        let config = FusionConfig::default();

        let a = fuse(candidates.clone(), &config);
        let b = fuse(candidates, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn single_detector_above_threshold_is_kept() {
        let candidates = vec![candidate(30, "frame-difference", 0.95)];
        let config = FusionConfig::default();
        let boundaries = fuse(candidates, &config);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].frame_index, 30);
    }

    #[test]
    fn below_threshold_candidates_are_dropped() {
        let candidates = vec![candidate(30, "frame-difference", 0.2)];
        let config = FusionConfig::default();
        assert!(fuse(candidates, &config).is_empty());
    }

    #[test]
    fn clustered_candidates_within_tolerance_merge_into_one() {
        let candidates = vec![
            candidate(30, "frame-difference", 0.9),
            candidate(32, "histogram", 0.85),
        ];
        let mut config = FusionConfig::default();
        config.cluster_tolerance = 5;
        let boundaries = fuse(candidates, &config);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].contributing_algorithms.len(), 2);
    }

    #[test]
    fn near_duplicate_buckets_keep_highest_confidence() {
        let candidates = vec![
            candidate(30, "frame-difference", 0.9),
            candidate(40, "histogram", 0.7),
        ];
        let mut config = FusionConfig::default();
        config.cluster_tolerance = 1;
        config.min_shot_frames = 20;
        let boundaries = fuse(candidates, &config);
        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].frame_index, 30);
    }
}
