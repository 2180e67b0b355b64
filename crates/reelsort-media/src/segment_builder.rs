//! Segment builder (C4): turns fused Boundaries into Segments.

use reelsort_core::{FilterFlag, Segment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OversizedPolicy {
    KeepFlagged,
    SplitUniform,
}

#[derive(Debug, Clone)]
pub struct SegmentBuilderConfig {
    pub min_duration_seconds: f64,
    pub max_duration_seconds: f64,
    pub oversized_policy: OversizedPolicy,
}

impl Default for SegmentBuilderConfig {
    fn default() -> Self {
        Self {
            min_duration_seconds: 0.5,
            max_duration_seconds: 120.0,
            oversized_policy: OversizedPolicy::KeepFlagged,
        }
    }
}

/// A boundary's frame index paired with its fusion confidence, the only
/// two fields the builder needs.
#[derive(Debug, Clone, Copy)]
pub struct BoundaryMarker {
    pub frame_index: u64,
    pub confidence: f64,
}

/// Build segments from sorted boundary markers and a total frame count.
///
/// Virtual boundaries are synthesized at frame 0 and `total_frames`
/// (confidence 1.0, since they're not subject to min-duration merging on
/// their own account). A zero-frame or single-frame video yields zero or
/// one segment respectively, never panicking.
pub fn build_segments(
    video_checksum: &str,
    fps: f64,
    total_frames: u64,
    boundaries: &[BoundaryMarker],
    config: &SegmentBuilderConfig,
) -> Vec<Segment> {
    if total_frames == 0 {
        return Vec::new();
    }

    let mut markers: Vec<BoundaryMarker> = Vec::with_capacity(boundaries.len() + 2);
    markers.push(BoundaryMarker {
        frame_index: 0,
        confidence: 1.0,
    });
    for b in boundaries {
        if b.frame_index > 0 && b.frame_index < total_frames {
            markers.push(*b);
        }
    }
    markers.push(BoundaryMarker {
        frame_index: total_frames,
        confidence: 1.0,
    });
    markers.dedup_by_key(|m| m.frame_index);

    let mut segments: Vec<(u64, u64, Vec<FilterFlag>)> = markers
        .windows(2)
        .map(|pair| (pair[0].frame_index, pair[1].frame_index, Vec::new()))
        .filter(|(start, end, _)| start < end)
        .collect();

    merge_short_segments(&mut segments, &markers, fps, config.min_duration_seconds);
    let segments = apply_oversized_policy(segments, fps, config);

    segments
        .into_iter()
        .map(|(start, end, flags)| Segment::new(video_checksum, start, end, fps, flags))
        .collect()
}

fn merge_short_segments(
    segments: &mut Vec<(u64, u64, Vec<FilterFlag>)>,
    markers: &[BoundaryMarker],
    fps: f64,
    min_duration_seconds: f64,
) {
    let confidence_at = |frame_index: u64| -> f64 {
        markers
            .iter()
            .find(|m| m.frame_index == frame_index)
            .map(|m| m.confidence)
            .unwrap_or(1.0)
    };

    let mut i = 0;
    while i < segments.len() {
        let (start, end, _) = segments[i];
        let duration = (end - start) as f64 / fps;
        if duration >= min_duration_seconds || segments.len() == 1 {
            i += 1;
            continue;
        }

        let left_confidence = if i > 0 { Some(confidence_at(start)) } else { None };
        let right_confidence = if i + 1 < segments.len() {
            Some(confidence_at(end))
        } else {
            None
        };

        let merge_left = match (left_confidence, right_confidence) {
            (Some(l), Some(r)) => l <= r,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => true,
        };

        if merge_left && i > 0 {
            let prev_start = segments[i - 1].0;
            let mut flags = segments[i - 1].2.clone();
            flags.push(FilterFlag::MergedNeighbor);
            segments[i - 1] = (prev_start, end, flags);
            segments.remove(i);
        } else if i + 1 < segments.len() {
            let next_end = segments[i + 1].1;
            let mut flags = segments[i + 1].2.clone();
            flags.push(FilterFlag::MergedNeighbor);
            segments[i + 1] = (start, next_end, flags);
            segments.remove(i);
        } else {
            i += 1;
        }
    }
}

fn apply_oversized_policy(
    segments: Vec<(u64, u64, Vec<FilterFlag>)>,
    fps: f64,
    config: &SegmentBuilderConfig,
) -> Vec<(u64, u64, Vec<FilterFlag>)> {
    let max_frames = (config.max_duration_seconds * fps).round() as u64;
    if max_frames == 0 {
        return segments;
    }

    let mut result = Vec::new();
    for (start, end, mut flags) in segments {
        let span = end - start;
        if span <= max_frames {
            result.push((start, end, flags));
            continue;
        }

        match config.oversized_policy {
            OversizedPolicy::KeepFlagged => {
                flags.push(FilterFlag::Oversized);
                result.push((start, end, flags));
            }
            OversizedPolicy::SplitUniform => {
                let mut cursor = start;
                while cursor < end {
                    let piece_end = (cursor + max_frames).min(end);
                    result.push((cursor, piece_end, Vec::new()));
                    cursor = piece_end;
                }
            }
        }
    }
    result
}
