//! `workflow` subcommand: scan → detect → analyze → match → organize
//! every video under a directory, reporting progress as an `indicatif`
//! bar on an interactive terminal or as streaming JSON-lines otherwise.

use std::io::IsTerminal;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use reelsort_ai::AiClient;
use reelsort_analysis::{AnalysisOrchestrator, PromptRegistry};
use reelsort_cache::CacheStore;
use reelsort_match::{FolderMatcher, FolderMatcherConfig};
use reelsort_media::{Detector, FrameDifference, Histogram, MediaReader};
use reelsort_organize::{FileOrganizer, OperationHistory};
use reelsort_workflow::{PipelineComponents, WorkflowConfig, WorkflowEngine};
use tokio::sync::watch;

use crate::cli::WorkflowArgs;
use crate::error::CliError;

pub async fn run(args: &WorkflowArgs, json_lines: bool) -> Result<(), CliError> {
    if !args.dir.is_dir() {
        return Err(CliError::Input(format!("not a directory: {}", args.dir.display())));
    }

    let mut config = WorkflowConfig::from_env();
    config.destination_root = args.target.clone();
    config.min_match_confidence = args.min_confidence_move;
    if let Some(concurrency) = args.concurrency {
        config.concurrency = concurrency;
    }

    let cache = CacheStore::open(&config.cache_dir, reelsort_core::SCHEMA_VERSION).await?;
    let ai = Arc::new(AiClient::from_env()?);
    let prompts = Arc::new(PromptRegistry::new(None));

    let orchestrator = AnalysisOrchestrator::new(cache, ai.clone(), prompts.clone());
    let matcher = FolderMatcher::new(
        ai.clone(),
        prompts.clone(),
        FolderMatcherConfig {
            max_depth: 3,
            min_confidence: config.min_match_confidence,
            max_matches: config.max_matches,
        },
    );

    let history_path = config.cache_dir.join("history").join("operations.log");
    if let Some(parent) = history_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let organizer = FileOrganizer::new(OperationHistory::open(history_path).await?);

    let detectors: Vec<Arc<dyn Detector>> = vec![Arc::new(FrameDifference::default()), Arc::new(Histogram::default())];
    let components = PipelineComponents::new(MediaReader::default(), detectors, orchestrator, matcher, organizer);

    let engine = WorkflowEngine::new(config, components);
    let videos = engine.scan(&args.dir);

    let (cancel_tx, cancel_rx) = watch::channel(false);
    let ctrl_c = tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        let _ = cancel_tx.send(true);
    });

    let use_bar = !json_lines && std::io::stdout().is_terminal();
    let total = videos.len() as u64;
    let bar = use_bar.then(|| {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.green} [{bar:32.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        bar
    });
    let bar_for_sink = bar.clone();

    let progress_sink: reelsort_workflow::WorkflowProgressSink = Arc::new(move |progress| {
        if let Some(bar) = &bar_for_sink {
            bar.set_position(progress.processed as u64);
            bar.set_message(format!("{:?}: {}", progress.phase, progress.step));
        } else if let Ok(line) = serde_json::to_string(&progress) {
            println!("{line}");
        }
    });

    let summary = engine.run(videos, cancel_rx, progress_sink).await?;
    ctrl_c.abort();
    if let Some(bar) = &bar {
        bar.finish_and_clear();
    }

    let result_line = serde_json::json!({
        "total": summary.total,
        "succeeded": summary.succeeded,
        "failed": summary.failed,
        "cancelled": summary.cancelled,
        "finishedAt": chrono::Utc::now().to_rfc3339(),
    });
    println!("{}", serde_json::to_string(&result_line)?);

    if summary.cancelled {
        return Err(CliError::Cancelled);
    }
    if summary.failed > 0 {
        return Err(CliError::PartialFailure {
            succeeded: summary.succeeded,
            failed: summary.failed,
        });
    }
    Ok(())
}
