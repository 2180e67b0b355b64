//! File organizer orchestrator (C9): given a segment file, its analysis,
//! and a target folder, produces a `FileOperationRecord`.

use std::path::{Path, PathBuf};

use chrono::Utc;
use reelsort_core::{AnalysisResult, ConflictPolicy, FileOp, FileOperationRecord, NamingMode};
use tokio::fs;
use tracing::{info, warn};

use crate::conflict::{resolve, Resolution};
use crate::error::OrganizeResult;
use crate::fs_utils::{copy_file_verified, move_file};
use crate::history::OperationHistory;
use crate::naming::{generate_filename, CustomNamer};
use crate::sanitize::sanitize_filename;

/// The action requested of the organizer (distinct from `FileOp`, which
/// also records the `skip` outcome).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedOp {
    Move,
    Copy,
}

#[derive(Clone)]
pub struct OrganizeConfig {
    pub naming_mode: NamingMode,
    pub conflict_policy: ConflictPolicy,
    pub operation: RequestedOp,
    pub create_target_dir: bool,
    /// Backup directory for move-mode; when set, the original is copied
    /// here (timestamp-prefixed) before the move proceeds.
    pub backup_dir: Option<PathBuf>,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            naming_mode: NamingMode::PreserveOriginal,
            conflict_policy: ConflictPolicy::Rename,
            operation: RequestedOp::Move,
            create_target_dir: true,
            backup_dir: None,
        }
    }
}

pub struct FileOrganizer {
    history: OperationHistory,
}

impl FileOrganizer {
    pub fn new(history: OperationHistory) -> Self {
        Self { history }
    }

    /// Organize `source_path` into `target_folder`, recording the outcome
    /// (success or failure) in the append-only history either way.
    pub async fn organize(
        &self,
        source_path: &Path,
        analysis: Option<&AnalysisResult>,
        target_folder: &Path,
        config: &OrganizeConfig,
        custom_namer: Option<&CustomNamer>,
    ) -> OrganizeResult<FileOperationRecord> {
        let record = self.organize_inner(source_path, analysis, target_folder, config, custom_namer).await;
        let (record, result) = match record {
            Ok(r) => (r, Ok(())),
            Err((partial, e)) => (partial, Err(e)),
        };

        let stored = self.history.append(record.clone()).await?;
        if let Err(e) = result {
            warn!(source = %source_path.display(), error = %e, "organize failed");
            return Err(e);
        }
        info!(source = %source_path.display(), new_path = %stored.new_path, "organize succeeded");
        Ok(stored)
    }

    async fn organize_inner(
        &self,
        source_path: &Path,
        analysis: Option<&AnalysisResult>,
        target_folder: &Path,
        config: &OrganizeConfig,
        custom_namer: Option<&CustomNamer>,
    ) -> Result<FileOperationRecord, (FileOperationRecord, crate::error::OrganizeError)> {
        let blank_record = |op: FileOp, error: Option<String>, success: bool| FileOperationRecord {
            schema_version: reelsort_core::SCHEMA_VERSION,
            sequence: 0,
            original_path: source_path.display().to_string(),
            new_path: String::new(),
            op,
            backup_path: None,
            success,
            error,
        };

        if config.create_target_dir {
            if let Err(e) = fs::create_dir_all(target_folder).await {
                let err = crate::error::OrganizeError::from(e);
                return Err((blank_record(requested_op_as_file_op(config.operation), Some(err.to_string()), false), err));
            }
        }

        let filename = sanitize_filename(&generate_filename(
            &source_path.display().to_string(),
            config.naming_mode,
            analysis,
            custom_namer,
        ));
        let mut dst = target_folder.join(&filename);

        let resolution = match resolve(&dst, config.conflict_policy).await {
            Ok(r) => r,
            Err(e) => {
                return Err((blank_record(requested_op_as_file_op(config.operation), Some(e.to_string()), false), e));
            }
        };

        let dst_path = match resolution {
            Resolution::Proceed(path) => path,
            Resolution::Skip => {
                let mut record = blank_record(FileOp::Skip, None, true);
                record.new_path = dst.display().to_string();
                return Ok(record);
            }
        };
        dst = dst_path;

        let mut backup_path = None;
        if config.operation == RequestedOp::Move {
            if let Some(backup_dir) = &config.backup_dir {
                if let Err(e) = fs::create_dir_all(backup_dir).await {
                    let err = crate::error::OrganizeError::from(e);
                    return Err((blank_record(FileOp::Move, Some(err.to_string()), false), err));
                }
                let backup_name = format!("{}_{}", Utc::now().format("%Y%m%dT%H%M%SZ"), filename);
                let backup_dst = backup_dir.join(&backup_name);
                if let Err(e) = copy_file_verified(source_path, &backup_dst).await {
                    return Err((blank_record(FileOp::Move, Some(e.to_string()), false), e));
                }
                backup_path = Some(backup_dst.display().to_string());
            }
        }

        let op_result = match config.operation {
            RequestedOp::Move => move_file(source_path, &dst).await,
            RequestedOp::Copy => copy_file_verified(source_path, &dst).await,
        };

        match op_result {
            Ok(()) => {
                let mut record = blank_record(requested_op_as_file_op(config.operation), None, true);
                record.new_path = dst.display().to_string();
                record.backup_path = backup_path;
                Ok(record)
            }
            Err(e) => {
                let mut record = blank_record(requested_op_as_file_op(config.operation), Some(e.to_string()), false);
                record.new_path = dst.display().to_string();
                record.backup_path = backup_path;
                Err((record, e))
            }
        }
    }
}

fn requested_op_as_file_op(op: RequestedOp) -> FileOp {
    match op {
        RequestedOp::Move => FileOp::Move,
        RequestedOp::Copy => FileOp::Copy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn organizer_with_history(dir: &TempDir) -> FileOrganizer {
        let history = OperationHistory::open(dir.path().join("history.jsonl")).await.unwrap();
        FileOrganizer::new(history)
    }

    #[tokio::test]
    async fn copy_with_rename_conflict_leaves_original_intact_and_checksums_match() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("clip.mp4");
        fs::write(&source, b"video bytes").await.unwrap();
        fs::write(dst_dir.path().join("clip.mp4"), b"existing file").await.unwrap();

        let organizer = organizer_with_history(&src_dir).await;
        let config = OrganizeConfig {
            naming_mode: NamingMode::PreserveOriginal,
            conflict_policy: ConflictPolicy::Rename,
            operation: RequestedOp::Copy,
            create_target_dir: true,
            backup_dir: None,
        };

        let record = organizer.organize(&source, None, dst_dir.path(), &config, None).await.unwrap();

        assert!(record.success);
        assert_eq!(record.op, FileOp::Copy);
        assert!(record.new_path.ends_with("clip_1.mp4"));
        assert!(source.exists());
        let src_bytes = fs::read(&source).await.unwrap();
        let dst_bytes = fs::read(&record.new_path).await.unwrap();
        assert_eq!(src_bytes, dst_bytes);
    }

    #[tokio::test]
    async fn move_deletes_original_and_new_file_exists() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("clip.mp4");
        fs::write(&source, b"video bytes").await.unwrap();

        let organizer = organizer_with_history(&src_dir).await;
        let config = OrganizeConfig::default();

        let record = organizer.organize(&source, None, dst_dir.path(), &config, None).await.unwrap();

        assert!(record.success);
        assert!(!source.exists());
        assert!(Path::new(&record.new_path).exists());
    }

    #[tokio::test]
    async fn skip_policy_records_skip_without_touching_files() {
        let src_dir = TempDir::new().unwrap();
        let dst_dir = TempDir::new().unwrap();
        let source = src_dir.path().join("clip.mp4");
        fs::write(&source, b"video bytes").await.unwrap();
        fs::write(dst_dir.path().join("clip.mp4"), b"existing file").await.unwrap();

        let organizer = organizer_with_history(&src_dir).await;
        let config = OrganizeConfig {
            naming_mode: NamingMode::PreserveOriginal,
            conflict_policy: ConflictPolicy::Skip,
            operation: RequestedOp::Move,
            create_target_dir: true,
            backup_dir: None,
        };

        let record = organizer.organize(&source, None, dst_dir.path(), &config, None).await.unwrap();

        assert_eq!(record.op, FileOp::Skip);
        assert!(source.exists());
    }
}
