//! Conflict resolution for a generated destination path (spec.md 4.9 step 4).

use std::path::{Path, PathBuf};

use reelsort_core::ConflictPolicy;
use tokio::fs::OpenOptions;

use crate::error::{OrganizeError, OrganizeResult};

const MAX_RENAME_ATTEMPTS: u32 = 1000;

/// Outcome of conflict resolution: either proceed at the (possibly
/// renamed) path, or skip the operation entirely.
pub enum Resolution {
    Proceed(PathBuf),
    Skip,
}

/// Resolve `dst` against `policy` when a file already exists there.
///
/// `rename` claims the winning path atomically via `O_CREAT|O_EXCL`
/// (`create_new`), so the existence check and the claim can't race
/// against a concurrent organizer run.
pub async fn resolve(dst: &Path, policy: ConflictPolicy) -> OrganizeResult<Resolution> {
    if !dst.exists() {
        return Ok(Resolution::Proceed(dst.to_path_buf()));
    }

    match policy {
        ConflictPolicy::Skip => Ok(Resolution::Skip),
        ConflictPolicy::Overwrite => Ok(Resolution::Proceed(dst.to_path_buf())),
        ConflictPolicy::Rename => {
            let stem = dst.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
            let ext = dst.extension().map(|e| e.to_string_lossy().to_string());
            let parent = dst.parent().unwrap_or_else(|| Path::new("."));

            for n in 1..=MAX_RENAME_ATTEMPTS {
                let candidate_name = match &ext {
                    Some(ext) => format!("{}_{}.{}", stem, n, ext),
                    None => format!("{}_{}", stem, n),
                };
                let candidate = parent.join(candidate_name);

                match OpenOptions::new().write(true).create_new(true).open(&candidate).await {
                    Ok(_) => return Ok(Resolution::Proceed(candidate)),
                    Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                    Err(e) => return Err(OrganizeError::from(e)),
                }
            }
            Err(OrganizeError::RenameExhausted(dst.display().to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn no_conflict_proceeds_at_original_path() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("clip.mp4");
        let resolution = resolve(&dst, ConflictPolicy::Rename).await.unwrap();
        match resolution {
            Resolution::Proceed(path) => assert_eq!(path, dst),
            Resolution::Skip => panic!("expected Proceed"),
        }
    }

    #[tokio::test]
    async fn skip_policy_skips_on_conflict() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("clip.mp4");
        tokio::fs::write(&dst, b"existing").await.unwrap();
        let resolution = resolve(&dst, ConflictPolicy::Skip).await.unwrap();
        assert!(matches!(resolution, Resolution::Skip));
    }

    #[tokio::test]
    async fn rename_policy_claims_first_free_suffixed_path() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("clip.mp4");
        tokio::fs::write(&dst, b"existing").await.unwrap();

        let resolution = resolve(&dst, ConflictPolicy::Rename).await.unwrap();
        match resolution {
            Resolution::Proceed(path) => {
                assert_eq!(path, dir.path().join("clip_1.mp4"));
                assert!(path.exists());
            }
            Resolution::Skip => panic!("expected Proceed"),
        }
    }

    #[tokio::test]
    async fn overwrite_policy_proceeds_at_original_path() {
        let dir = TempDir::new().unwrap();
        let dst = dir.path().join("clip.mp4");
        tokio::fs::write(&dst, b"existing").await.unwrap();
        let resolution = resolve(&dst, ConflictPolicy::Overwrite).await.unwrap();
        match resolution {
            Resolution::Proceed(path) => assert_eq!(path, dst),
            Resolution::Skip => panic!("expected Proceed"),
        }
    }
}
