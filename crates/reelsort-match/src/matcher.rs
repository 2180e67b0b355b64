//! Folder matcher orchestrator (C8): combines rule and semantic scores
//! into ranked `MatchResult`s for one segment's analysis.

use std::sync::Arc;

use reelsort_ai::AiClient;
use reelsort_analysis::PromptRegistry;
use reelsort_core::{AnalysisResult, FolderCandidate, MatchResult};
use tokio::sync::watch;

use crate::error::MatcherResult;
use crate::rule_score::{content_description, rule_score};
use crate::scanner::FolderScanner;
use crate::semantic::semantic_scores;

#[derive(Debug, Clone)]
pub struct FolderMatcherConfig {
    pub max_depth: usize,
    pub min_confidence: f64,
    pub max_matches: usize,
}

impl Default for FolderMatcherConfig {
    fn default() -> Self {
        Self {
            max_depth: 3,
            min_confidence: 0.0,
            max_matches: 10,
        }
    }
}

pub struct FolderMatcher {
    scanner: FolderScanner,
    ai: Arc<AiClient>,
    prompts: Arc<PromptRegistry>,
    config: FolderMatcherConfig,
}

impl FolderMatcher {
    pub fn new(ai: Arc<AiClient>, prompts: Arc<PromptRegistry>, config: FolderMatcherConfig) -> Self {
        Self {
            scanner: FolderScanner::new(config.max_depth),
            ai,
            prompts,
            config,
        }
    }

    /// Match `analysis` against every folder found under `scan_root`,
    /// returning ranked `MatchResult`s filtered by `minConfidence` and
    /// truncated to `maxMatches`.
    pub async fn match_segment(
        &self,
        analysis: &AnalysisResult,
        scan_root: &std::path::Path,
        cancel: &watch::Receiver<bool>,
    ) -> MatcherResult<Vec<MatchResult>> {
        let candidates = self.scanner.scan(scan_root)?;
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let description = content_description(analysis);
        let semantic = semantic_scores(&self.ai, &self.prompts, &description, &candidates, cancel).await?;

        let results = self.merge(analysis, &candidates, &semantic);
        Ok(rank(results, self.config.min_confidence, self.config.max_matches))
    }

    fn merge(&self, analysis: &AnalysisResult, candidates: &[FolderCandidate], semantic: &[crate::semantic::SemanticMatch]) -> Vec<MatchResult> {
        candidates
            .iter()
            .map(|folder| {
                let (rule, mut reasons) = rule_score(analysis, &folder.display_name);
                let semantic_match = semantic.iter().find(|s| s.folder_path == folder.absolute_path);
                let semantic_score = semantic_match.map(|s| s.score).unwrap_or(0.0);
                if let Some(s) = semantic_match {
                    for reason in &s.reasons {
                        if !reasons.contains(reason) {
                            reasons.push(reason.clone());
                        }
                    }
                }
                MatchResult::new(&analysis.segment_id, &folder.absolute_path, rule, semantic_score, reasons)
            })
            .collect()
    }

}

/// Filter by `min_confidence`, sort descending by confidence, truncate to
/// `max_matches`.
fn rank(mut results: Vec<MatchResult>, min_confidence: f64, max_matches: usize) -> Vec<MatchResult> {
    results.retain(|m| m.confidence >= min_confidence);
    results.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(max_matches);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelsort_core::Summary;

    fn analysis_with(category: &str, description: &str) -> AnalysisResult {
        let mut a = AnalysisResult::new("seg1", "model-a", "fp1");
        a.summary = Summary {
            description: description.to_string(),
            keywords: vec![],
            topics: vec![],
            mood: String::new(),
            category: category.to_string(),
        };
        a
    }

    #[test]
    fn rank_sorts_descending_and_truncates() {
        let results = vec![
            MatchResult::new("seg1", "/a", 0.3, 0.2, vec![]),
            MatchResult::new("seg1", "/b", 0.9, 0.1, vec![]),
        ];
        let ranked = rank(results, 0.0, 1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].folder_path, "/b");
    }

    #[test]
    fn merge_takes_max_of_rule_and_semantic_as_confidence() {
        let analysis = analysis_with("product", "a red product showcase");
        let folder = FolderCandidate {
            absolute_path: "/dest/products".into(),
            display_name: "products".into(),
            depth: 1,
        };
        let semantic = vec![crate::semantic::SemanticMatch {
            folder_path: "/dest/products".into(),
            score: 0.9,
            reasons: vec!["semantic match".into()],
        }];
        let ai = Arc::new(reelsort_ai::AiClient::new(reelsort_ai::AiClientConfig {
            api_key: "test".into(),
            endpoint: "http://localhost".into(),
            model: "test-model".into(),
            timeout: std::time::Duration::from_secs(1),
            max_concurrent_requests: 1,
        }));
        let prompts = Arc::new(PromptRegistry::new(None));
        let matcher = FolderMatcher::new(ai, prompts, FolderMatcherConfig::default());
        let results = matcher.merge(&analysis, &[folder], &semantic);
        assert_eq!(results.len(), 1);
        assert!((results[0].confidence - 0.9).abs() < 1e-9);
    }
}
