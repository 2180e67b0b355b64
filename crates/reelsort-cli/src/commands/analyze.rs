//! `analyze` subcommand: run the analysis orchestrator against one video
//! file as a whole (no segment boundaries are computed here; that is
//! `detect`'s job).

use std::sync::Arc;

use reelsort_ai::AiClient;
use reelsort_analysis::{AnalysisOrchestrator, PromptKind, PromptRegistry};
use reelsort_cache::CacheStore;
use reelsort_media::MediaReader;
use tokio::sync::watch;

use crate::cli::AnalyzeArgs;
use crate::commands::{cache_dir, require_file};
use crate::error::CliError;

fn prompt_registry_and_kind(prompt: &str) -> Result<(PromptRegistry, PromptKind), CliError> {
    match prompt {
        "comprehensive" => Ok((PromptRegistry::new(None), PromptKind::Comprehensive)),
        "product" => Ok((PromptRegistry::new(None), PromptKind::Product)),
        "scene" => Ok((PromptRegistry::new(None), PromptKind::Scene)),
        "object" => Ok((PromptRegistry::new(None), PromptKind::Object)),
        path => {
            let path = std::path::Path::new(path);
            if path.file_name().and_then(|n| n.to_str()) != Some("custom.txt") {
                return Err(CliError::Input(
                    "custom prompt must name a known prompt (comprehensive, product, scene, object) or a path ending in custom.txt".to_string(),
                ));
            }
            let dir = path.parent().map(|p| p.to_path_buf());
            Ok((PromptRegistry::new(dir), PromptKind::Custom))
        }
    }
}

pub async fn run(args: &AnalyzeArgs) -> Result<serde_json::Value, CliError> {
    require_file(&args.file)?;

    let reader = MediaReader::default();
    let video = reader.probe(&args.file).await?;

    let cache_root = if args.no_cache {
        std::env::temp_dir().join(format!("reelsort-analyze-nocache-{}", video.checksum))
    } else {
        cache_dir()
    };
    let cache = CacheStore::open(cache_root, reelsort_core::SCHEMA_VERSION).await?;

    let mut ai_config = reelsort_ai::AiClientConfig::from_env()?;
    ai_config.timeout = std::time::Duration::from_secs(args.timeout);
    let ai = Arc::new(AiClient::new(ai_config));
    let (registry, kind) = prompt_registry_and_kind(&args.prompt)?;
    let orchestrator = AnalysisOrchestrator::new(cache, ai, Arc::new(registry));

    let description = format!(
        "Video file {} — {:.2}s at {:.2} fps, {}x{}.",
        args.file.display(),
        video.duration_seconds,
        video.fps,
        video.width,
        video.height
    );

    let (_tx, rx) = watch::channel(false);
    let progress: reelsort_analysis::ProgressSink = Arc::new(|_| {});

    let result = orchestrator
        .analyze_segment(&video.checksum, &description, &video.checksum, &[kind], &rx, &progress)
        .await?;

    Ok(serde_json::to_value(result)?)
}
