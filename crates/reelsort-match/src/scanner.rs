//! Recursive folder scan producing `FolderCandidate`s, capped at a
//! configurable depth and cached in-process per scanned root.

use std::collections::HashMap;
use std::path::Path;
use std::sync::RwLock;

use reelsort_core::FolderCandidate;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{MatchError, MatcherResult};

const DEFAULT_MAX_DEPTH: usize = 3;

/// Scans destination roots for candidate folders, memoizing results per
/// root so a workflow run touching many segments only walks each root once.
pub struct FolderScanner {
    max_depth: usize,
    cache: RwLock<HashMap<String, Vec<FolderCandidate>>>,
}

impl FolderScanner {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Scan `root` for candidate folders, up to `max_depth` levels deep.
    /// Subsequent calls for the same root return the cached result.
    pub fn scan(&self, root: impl AsRef<Path>) -> MatcherResult<Vec<FolderCandidate>> {
        let root = root.as_ref();
        let root_key = root.to_string_lossy().to_string();

        if let Some(cached) = self.cache.read().unwrap().get(&root_key) {
            return Ok(cached.clone());
        }

        if !root.exists() {
            return Err(MatchError::ScanRootMissing(root_key));
        }

        let mut candidates = Vec::new();
        for entry in WalkDir::new(root)
            .min_depth(1)
            .max_depth(self.max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_dir())
        {
            let depth = entry.depth();
            let display_name = entry.file_name().to_string_lossy().to_string();
            candidates.push(FolderCandidate {
                absolute_path: entry.path().to_string_lossy().to_string(),
                display_name,
                depth,
            });
        }

        debug!(root = %root_key, count = candidates.len(), "scanned folder candidates");
        self.cache.write().unwrap().insert(root_key, candidates.clone());
        Ok(candidates)
    }

    /// Drop a cached scan so the next `scan` call re-walks the filesystem.
    pub fn invalidate(&self, root: impl AsRef<Path>) {
        let root_key = root.as_ref().to_string_lossy().to_string();
        self.cache.write().unwrap().remove(&root_key);
    }
}

impl Default for FolderScanner {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn scan_finds_nested_directories_up_to_max_depth() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a/b/c/d")).unwrap();

        let scanner = FolderScanner::new(2);
        let found = scanner.scan(dir.path()).unwrap();

        let names: Vec<_> = found.iter().map(|c| c.display_name.clone()).collect();
        assert!(names.contains(&"a".to_string()));
        assert!(names.contains(&"b".to_string()));
        assert!(!names.contains(&"c".to_string()));
    }

    #[test]
    fn scan_is_cached_across_calls() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("a")).unwrap();

        let scanner = FolderScanner::default();
        let first = scanner.scan(dir.path()).unwrap();

        std::fs::create_dir_all(dir.path().join("b")).unwrap();
        let second = scanner.scan(dir.path()).unwrap();

        assert_eq!(first.len(), second.len());
    }

    #[test]
    fn scan_missing_root_errors() {
        let scanner = FolderScanner::default();
        let result = scanner.scan("/nonexistent/path/for/reelsort/tests");
        assert!(result.is_err());
    }
}
