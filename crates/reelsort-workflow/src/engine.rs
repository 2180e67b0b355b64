//! Workflow engine (C10): bounded-concurrency driver over a scanned list
//! of input videos.
//!
//! Grounded on the teacher's `JobExecutor`: an `Arc<Semaphore>`-bounded
//! concurrent task pool and a `tokio::sync::watch`-based cooperative
//! shutdown channel, adapted here from a Redis-consumer loop to an
//! in-process `futures::stream` over a scanned file list, with
//! `buffer_unordered` standing in for the semaphore-gated spawn loop.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reelsort_core::{WorkflowPhase, WorkflowProgress};
use tokio::sync::watch;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::config::WorkflowConfig;
use crate::error::WorkflowResult;
use crate::pipeline::{process_video, PipelineComponents, VideoOutcome};

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm", "m4v"];

pub type WorkflowProgressSink = Arc<dyn Fn(WorkflowProgress) + Send + Sync>;

/// Summary returned once every scanned video has been processed, or the
/// run was cancelled partway through.
#[derive(Debug, Clone, Default)]
pub struct WorkflowSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub outcomes: Vec<VideoOutcome>,
}

pub struct WorkflowEngine {
    config: WorkflowConfig,
    components: PipelineComponents,
}

impl WorkflowEngine {
    pub fn new(config: WorkflowConfig, components: PipelineComponents) -> Self {
        Self { config, components }
    }

    /// Recursively scan `input_root` for video files, matched by extension.
    pub fn scan(&self, input_root: &Path) -> Vec<PathBuf> {
        WalkDir::new(input_root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter(|e| is_video_file(e.path()))
            .map(|e| e.into_path())
            .collect()
    }

    /// Run the full workflow over `videos`, bounded to
    /// `config.concurrency` concurrent videos, emitting progress through
    /// `progress` with no locks held across the callback, and honoring
    /// cooperative cancellation via `cancel`. A video that fails never
    /// blocks the rest of the run.
    pub async fn run(&self, videos: Vec<PathBuf>, cancel: watch::Receiver<bool>, progress: WorkflowProgressSink) -> WorkflowResult<WorkflowSummary> {
        let total = videos.len();
        let processed = Arc::new(AtomicUsize::new(0));

        progress(WorkflowProgress {
            phase: WorkflowPhase::Scanning,
            step: "scan complete".to_string(),
            percent: 0.0,
            processed: 0,
            total,
        });

        let concurrency = self.config.concurrency.max(1);

        let outcomes: Vec<(PathBuf, WorkflowResult<VideoOutcome>)> = stream::iter(videos.into_iter().map(|path| {
            let components = self.components.clone();
            let config = self.config.clone();
            let cancel = cancel.clone();
            let progress = progress.clone();
            let processed = processed.clone();

            async move {
                if *cancel.borrow() {
                    return (path, Err(crate::error::WorkflowError::Cancelled));
                }

                let result = process_video(&components, &config, &path, &cancel).await;
                let done = processed.fetch_add(1, Ordering::SeqCst) + 1;

                let phase = match &result {
                    Ok(_) => WorkflowPhase::Complete,
                    Err(_) => WorkflowPhase::Organizing,
                };
                progress(WorkflowProgress {
                    phase,
                    step: path.display().to_string(),
                    percent: (done as f64 / total.max(1) as f64) * 100.0,
                    processed: done,
                    total,
                });

                (path, result)
            }
        }))
        .buffer_unordered(concurrency)
        .collect()
        .await;

        let mut succeeded = 0usize;
        let mut failed = 0usize;
        let mut kept = Vec::with_capacity(outcomes.len());
        for (path, result) in outcomes {
            match result {
                Ok(outcome) => {
                    succeeded += 1;
                    kept.push(outcome);
                }
                Err(e) => {
                    failed += 1;
                    warn!(video = %path.display(), error = %e, "video processing failed, continuing with next");
                }
            }
        }

        let cancelled = *cancel.borrow();
        info!(total, succeeded, failed, cancelled, "workflow run complete");

        Ok(WorkflowSummary {
            total,
            succeeded,
            failed,
            cancelled,
            outcomes: kept,
        })
    }
}

fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_video_file_matches_known_extensions_case_insensitively() {
        assert!(is_video_file(Path::new("clip.MP4")));
        assert!(is_video_file(Path::new("clip.mov")));
        assert!(!is_video_file(Path::new("notes.txt")));
    }
}
