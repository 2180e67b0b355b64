//! Per-video processing pipeline (C10): probe, detect, fuse, segment,
//! analyze, match, and organize one source video end-to-end.
//!
//! Segment-level clip extraction is out of scope (the low-level
//! invocation of an external media encoder is an external collaborator),
//! so each segment's content description is synthesized from its own
//! metadata rather than from an extracted clip, and the organizer acts
//! on the whole source video rather than on per-segment files.

use std::path::Path;
use std::sync::Arc;

use reelsort_analysis::{AnalysisOrchestrator, PromptKind};
use reelsort_core::{Action, FileOperationRecord, MatchResult, Segment, Video};
use reelsort_match::FolderMatcher;
use reelsort_media::{build_segments, fuse, BoundaryMarker, Detector, MediaReader};
use reelsort_organize::{FileOrganizer, RequestedOp};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};

/// Outcome of processing a single source video through the full pipeline.
#[derive(Debug, Clone)]
pub struct VideoOutcome {
    pub video_path: String,
    pub segment_count: usize,
    pub analyzed_count: usize,
    pub best_match: Option<MatchResult>,
    pub organize_record: Option<FileOperationRecord>,
}

/// The shared, reusable components one workflow run threads through every
/// video it processes. Cheap to clone: every field is already behind an
/// `Arc`.
#[derive(Clone)]
pub struct PipelineComponents {
    pub reader: Arc<MediaReader>,
    pub detectors: Arc<Vec<Arc<dyn Detector>>>,
    pub orchestrator: Arc<AnalysisOrchestrator>,
    pub matcher: Arc<FolderMatcher>,
    pub organizer: Arc<FileOrganizer>,
}

impl PipelineComponents {
    pub fn new(
        reader: MediaReader,
        detectors: Vec<Arc<dyn Detector>>,
        orchestrator: AnalysisOrchestrator,
        matcher: FolderMatcher,
        organizer: FileOrganizer,
    ) -> Self {
        Self {
            reader: Arc::new(reader),
            detectors: Arc::new(detectors),
            orchestrator: Arc::new(orchestrator),
            matcher: Arc::new(matcher),
            organizer: Arc::new(organizer),
        }
    }
}

/// Process one source video through detection, analysis, matching, and
/// organizing.
pub async fn process_video(
    components: &PipelineComponents,
    config: &WorkflowConfig,
    video_path: &Path,
    cancel: &watch::Receiver<bool>,
) -> WorkflowResult<VideoOutcome> {
    let video = components.reader.probe(video_path).await?;
    let total_frames = video.total_frames();
    let frames = components.reader.frames(&video, 1).await?;

    let mut candidates = Vec::new();
    for detector in components.detectors.iter() {
        if *cancel.borrow() {
            return Err(WorkflowError::Cancelled);
        }
        let sink: reelsort_media::ProgressSink = Box::new(|_| {});
        let mut detected = detector.detect_boundaries(&frames, &sink).await?;
        candidates.append(&mut detected);
    }

    let boundaries = fuse(candidates, &config.fusion);
    let markers: Vec<BoundaryMarker> = boundaries
        .iter()
        .map(|b| BoundaryMarker {
            frame_index: b.frame_index,
            confidence: b.confidence,
        })
        .collect();

    let segments = build_segments(&video.checksum, video.fps, total_frames, &markers, &config.segment_builder);

    let mut analyzed_count = 0usize;
    let mut best_match: Option<MatchResult> = None;

    for segment in &segments {
        if *cancel.borrow() {
            return Err(WorkflowError::Cancelled);
        }

        let description = synthesize_content_description(&video, segment);
        let progress: reelsort_analysis::ProgressSink = Arc::new(|_| {});

        let analysis = match components
            .orchestrator
            .analyze_segment(&segment.id, &description, &video.checksum, &[PromptKind::Comprehensive], cancel, &progress)
            .await
        {
            Ok(a) => a,
            Err(e) => {
                warn!(segment_id = %segment.id, error = %e, "segment analysis failed, skipping");
                continue;
            }
        };
        analyzed_count += 1;

        let matches = components.matcher.match_segment(&analysis, &config.destination_root, cancel).await?;

        if let Some(top) = matches.into_iter().next() {
            let replace = match &best_match {
                Some(existing) => top.confidence > existing.confidence,
                None => true,
            };
            if replace {
                best_match = Some(top);
            }
        }
    }

    let organize_record = organize_best_match(components, config, video_path, &best_match).await;

    info!(video = %video_path.display(), segments = segments.len(), analyzed = analyzed_count, "video processed");

    Ok(VideoOutcome {
        video_path: video_path.display().to_string(),
        segment_count: segments.len(),
        analyzed_count,
        best_match,
        organize_record,
    })
}

async fn organize_best_match(
    components: &PipelineComponents,
    config: &WorkflowConfig,
    video_path: &Path,
    best_match: &Option<MatchResult>,
) -> Option<FileOperationRecord> {
    let m = best_match.as_ref()?;
    if m.action == Action::Ignore {
        return None;
    }

    let mut organize_config = config.organize.clone();
    organize_config.operation = match m.action {
        Action::Move => RequestedOp::Move,
        Action::Copy | Action::Link => RequestedOp::Copy,
        Action::Ignore => unreachable!("checked above"),
    };

    let target_folder = Path::new(&m.folder_path);
    match components.organizer.organize(video_path, None, target_folder, &organize_config, None).await {
        Ok(record) => Some(record),
        Err(e) => {
            warn!(video = %video_path.display(), error = %e, "organize failed");
            None
        }
    }
}

/// Synthesize a textual content description for a segment from its own
/// metadata. Segment-level clip extraction is out of scope, so this is
/// the only content available to feed the analysis prompt.
fn synthesize_content_description(video: &Video, segment: &Segment) -> String {
    format!(
        "Video segment from {} spanning {:.2}s to {:.2}s ({:.2}s duration), {}x{} at {:.2} fps.",
        video.path, segment.start_time, segment.end_time, segment.duration_seconds, video.width, video.height, video.fps
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsort_core::FilterFlag;

    fn sample_video() -> Video {
        Video {
            path: "clip.mp4".to_string(),
            byte_len: 1024,
            duration_seconds: 10.0,
            fps: 30.0,
            width: 1920,
            height: 1080,
            checksum: "abc123".to_string(),
        }
    }

    #[test]
    fn content_description_names_the_source_file_and_time_range() {
        let video = sample_video();
        let segment = Segment::new(&video.checksum, 0, 300, video.fps, vec![]);

        let description = synthesize_content_description(&video, &segment);

        assert!(description.contains("clip.mp4"));
        assert!(description.contains("1920x1080"));
        assert!(description.contains(&format!("{:.2}", segment.start_time)));
        assert!(description.contains(&format!("{:.2}", segment.end_time)));
    }

    #[test]
    fn content_description_reflects_oversized_flag_free_segments() {
        let video = sample_video();
        let segment = Segment::new(&video.checksum, 0, 30, video.fps, vec![FilterFlag::Oversized]);
        let description = synthesize_content_description(&video, &segment);
        assert!(description.contains("1.00s duration"));
    }

    fn requested_op_for(action: Action) -> Option<RequestedOp> {
        match action {
            Action::Move => Some(RequestedOp::Move),
            Action::Copy | Action::Link => Some(RequestedOp::Copy),
            Action::Ignore => None,
        }
    }

    #[test]
    fn link_action_degrades_to_copy_since_organizer_has_no_link_op() {
        assert_eq!(requested_op_for(Action::Link), Some(RequestedOp::Copy));
        assert_eq!(requested_op_for(Action::Copy), Some(RequestedOp::Copy));
        assert_eq!(requested_op_for(Action::Move), Some(RequestedOp::Move));
        assert_eq!(requested_op_for(Action::Ignore), None);
    }
}
