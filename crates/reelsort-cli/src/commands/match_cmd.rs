//! `match` subcommand: score an AnalysisResult against candidate folders.

use std::sync::Arc;

use anyhow::Context;
use reelsort_ai::AiClient;
use reelsort_analysis::PromptRegistry;
use reelsort_core::AnalysisResult;
use reelsort_match::{FolderMatcher, FolderMatcherConfig};
use tokio::sync::watch;

use crate::cli::MatchArgs;
use crate::commands::require_file;
use crate::error::CliError;

pub async fn run(args: &MatchArgs) -> Result<serde_json::Value, CliError> {
    require_file(&args.analysis_json)?;
    if !args.folders.is_dir() {
        return Err(CliError::Input(format!("not a directory: {}", args.folders.display())));
    }

    let raw = tokio::fs::read_to_string(&args.analysis_json)
        .await
        .with_context(|| format!("reading analysis document {}", args.analysis_json.display()))?;
    let analysis: AnalysisResult =
        serde_json::from_str(&raw).with_context(|| format!("parsing analysis document {}", args.analysis_json.display()))?;

    let ai = Arc::new(AiClient::from_env()?);
    let prompts = Arc::new(PromptRegistry::new(None));
    let config = FolderMatcherConfig {
        max_depth: 3,
        min_confidence: args.min_confidence,
        max_matches: args.max_matches,
    };
    let matcher = FolderMatcher::new(ai, prompts, config);

    let (_tx, rx) = watch::channel(false);
    let matches = matcher.match_segment(&analysis, &args.folders, &rx).await?;

    Ok(serde_json::json!({ "matches": matches }))
}
