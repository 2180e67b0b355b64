//! `scan` subcommand: recursively list video files under a directory.

use std::path::PathBuf;

use walkdir::WalkDir;

use crate::cli::ScanArgs;
use crate::error::CliError;

const DEFAULT_EXTENSIONS: &[&str] = &["mp4", "mov", "mkv", "avi", "webm", "m4v"];

pub fn run(args: &ScanArgs) -> Result<Vec<PathBuf>, CliError> {
    if !args.dir.is_dir() {
        return Err(CliError::Input(format!("not a directory: {}", args.dir.display())));
    }

    let extensions: Vec<String> = if args.ext.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect()
    } else {
        args.ext.iter().map(|e| e.trim_start_matches('.').to_ascii_lowercase()).collect()
    };

    let max_depth = if args.recursive { usize::MAX } else { 1 };

    let mut results = Vec::new();
    for entry in WalkDir::new(&args.dir).min_depth(1).max_depth(max_depth).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let matches_ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| extensions.contains(&e.to_ascii_lowercase()))
            .unwrap_or(false);
        if !matches_ext {
            continue;
        }

        let len = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if let Some(min) = args.min_size {
            if len < min {
                continue;
            }
        }
        if let Some(max) = args.max_size {
            if len > max {
                continue;
            }
        }

        results.push(path.to_path_buf());
    }

    results.sort();
    Ok(results)
}
