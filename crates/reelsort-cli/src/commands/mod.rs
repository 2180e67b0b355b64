pub mod analyze;
pub mod detect;
pub mod match_cmd;
pub mod organize;
pub mod scan;
pub mod workflow;

use std::collections::BTreeMap;
use std::path::Path;

use reelsort_core::{ConflictPolicy, NamingMode};
use reelsort_organize::RequestedOp;

use crate::cli::{AlgorithmArg, ModeArg, NamingArg, OnConflictArg};
use crate::error::CliError;

pub fn naming_mode(arg: NamingArg) -> NamingMode {
    match arg {
        NamingArg::PreserveOriginal => NamingMode::PreserveOriginal,
        NamingArg::Smart => NamingMode::Smart,
        NamingArg::ContentBased => NamingMode::ContentBased,
        NamingArg::Timestamp => NamingMode::Timestamp,
        NamingArg::Custom => NamingMode::Custom,
    }
}

pub fn conflict_policy(arg: OnConflictArg) -> ConflictPolicy {
    match arg {
        OnConflictArg::Skip => ConflictPolicy::Skip,
        OnConflictArg::Overwrite => ConflictPolicy::Overwrite,
        OnConflictArg::Rename => ConflictPolicy::Rename,
    }
}

pub fn requested_op(arg: ModeArg) -> RequestedOp {
    match arg {
        ModeArg::Copy => RequestedOp::Copy,
        ModeArg::Move => RequestedOp::Move,
    }
}

pub fn algorithm_tags(arg: AlgorithmArg) -> &'static [&'static str] {
    match arg {
        AlgorithmArg::FrameDiff => &["frame-difference"],
        AlgorithmArg::Histogram => &["histogram"],
        AlgorithmArg::Multi => &["frame-difference", "histogram"],
    }
}

/// Parse `tag=weight,tag=weight` into a fusion weight map.
pub fn parse_fusion_weights(pairs: &[String]) -> Result<BTreeMap<String, f64>, CliError> {
    let mut weights = BTreeMap::new();
    for pair in pairs {
        let (tag, weight) = pair
            .split_once('=')
            .ok_or_else(|| CliError::Input(format!("invalid fusion weight '{pair}', expected tag=weight")))?;
        let weight: f64 = weight
            .parse()
            .map_err(|_| CliError::Input(format!("invalid fusion weight value in '{pair}'")))?;
        weights.insert(tag.to_string(), weight);
    }
    Ok(weights)
}

pub fn require_file(path: &Path) -> Result<(), CliError> {
    if !path.exists() {
        return Err(CliError::Input(format!("file not found: {}", path.display())));
    }
    Ok(())
}

pub fn cache_dir() -> std::path::PathBuf {
    std::env::var("REELSORT_CACHE_DIR")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("/tmp/reelsort-cache"))
}
