//! `organize` subcommand: move or copy one file into a target folder.

use anyhow::Context;
use reelsort_core::AnalysisResult;
use reelsort_organize::{FileOrganizer, OperationHistory, OrganizeConfig};

use crate::cli::OrganizeArgs;
use crate::commands::{cache_dir, conflict_policy, naming_mode, require_file, requested_op};
use crate::error::CliError;

pub async fn run(args: &OrganizeArgs) -> Result<serde_json::Value, CliError> {
    require_file(&args.file)?;

    let analysis: Option<AnalysisResult> = match &args.analysis {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading analysis document {}", path.display()))?;
            let parsed = serde_json::from_str(&raw)
                .with_context(|| format!("parsing analysis document {}", path.display()))?;
            Some(parsed)
        }
        None => None,
    };

    let history_path = cache_dir().join("history").join("operations.log");
    if let Some(parent) = history_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let history = OperationHistory::open(history_path).await?;
    let organizer = FileOrganizer::new(history);

    let config = OrganizeConfig {
        naming_mode: naming_mode(args.naming),
        conflict_policy: conflict_policy(args.on_conflict),
        operation: requested_op(args.mode),
        create_target_dir: true,
        backup_dir: None,
    };

    let record = organizer.organize(&args.file, analysis.as_ref(), &args.target, &config, None).await?;

    Ok(serde_json::to_value(record)?)
}
