//! Semantic folder matching: ask the remote AI client to judge which
//! candidate folder best fits a segment's content, with a keyword-overlap
//! fallback when the reply can't be parsed as the expected JSON shape.

use std::collections::HashMap;
use std::sync::Arc;

use reelsort_ai::{AiClient, GenerationParams};
use reelsort_analysis::{PromptKind, PromptRegistry};
use reelsort_core::FolderCandidate;
use serde::Deserialize;
use tokio::sync::watch;
use tracing::warn;

use crate::error::MatcherResult;

const DEGRADED_FALLBACK_BOOST: f64 = 0.3;
const DEGRADED_FALLBACK_CAP: f64 = 0.9;

/// One folder's semantic score plus the reasons backing it.
#[derive(Debug, Clone)]
pub struct SemanticMatch {
    pub folder_path: String,
    pub score: f64,
    pub reasons: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MatchesReply {
    #[serde(default)]
    matches: Vec<ReplyMatch>,
}

#[derive(Debug, Deserialize)]
struct ReplyMatch {
    #[serde(rename = "folderName")]
    folder_name: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    reasons: Vec<String>,
}

/// Ask C6 which of `candidates` best matches `content_description`, using
/// the shared `folder_match` prompt template. Falls back to keyword
/// overlap scoring, boosted and capped, when the reply is degraded or
/// doesn't parse into the expected shape.
pub async fn semantic_scores(
    ai: &Arc<AiClient>,
    prompts: &Arc<PromptRegistry>,
    content_description: &str,
    candidates: &[FolderCandidate],
    cancel: &watch::Receiver<bool>,
) -> MatcherResult<Vec<SemanticMatch>> {
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let folder_list = candidates.iter().map(|c| c.display_name.clone()).collect::<Vec<_>>().join(", ");
    let mut placeholders = HashMap::new();
    placeholders.insert("contentDescription", content_description.to_string());
    placeholders.insert("folderList", folder_list);

    let prompt_text = prompts.render(PromptKind::FolderMatch, &placeholders)?;

    let reply = ai.generate(&prompt_text, &[], &GenerationParams::default(), cancel).await?;

    if !reply.parsed.degraded {
        if let Ok(parsed) = serde_json::from_value::<MatchesReply>(reply.parsed.value.clone()) {
            return Ok(resolve_by_name(&parsed.matches, candidates));
        }
    }

    warn!("semantic reply degraded or unparseable, falling back to keyword overlap");
    Ok(keyword_overlap_fallback(&reply.text, candidates))
}

fn resolve_by_name(matches: &[ReplyMatch], candidates: &[FolderCandidate]) -> Vec<SemanticMatch> {
    matches
        .iter()
        .filter_map(|m| {
            candidates
                .iter()
                .find(|c| c.display_name == m.folder_name)
                .map(|c| SemanticMatch {
                    folder_path: c.absolute_path.clone(),
                    score: m.score.clamp(0.0, 1.0),
                    reasons: m.reasons.clone(),
                })
        })
        .collect()
}

/// Score each candidate by overlap between its display name and the raw
/// reply text, then boost (offsetting the downgrade) and cap below 1.0 so
/// a degraded reply never outranks a clean one.
fn keyword_overlap_fallback(raw_text: &str, candidates: &[FolderCandidate]) -> Vec<SemanticMatch> {
    candidates
        .iter()
        .filter_map(|c| {
            if raw_text.contains(&c.display_name) {
                let score = (0.3 + DEGRADED_FALLBACK_BOOST).min(DEGRADED_FALLBACK_CAP);
                Some(SemanticMatch {
                    folder_path: c.absolute_path.clone(),
                    score,
                    reasons: vec![format!("keyword overlap fallback: '{}' found in reply text", c.display_name)],
                })
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str) -> FolderCandidate {
        FolderCandidate {
            absolute_path: format!("/root/{}", name),
            display_name: name.to_string(),
            depth: 1,
        }
    }

    #[test]
    fn keyword_overlap_fallback_finds_chinese_folder_name_in_reply() {
        let candidates = vec![candidate("产品展示"), candidate("模特试穿")];
        let reply = "I think 产品展示 best, maybe 模特试穿.";
        let scores = keyword_overlap_fallback(reply, &candidates);
        assert_eq!(scores.len(), 2);
        assert!(scores.iter().all(|s| s.score >= 0.6 && s.score <= 0.9));
    }

    #[test]
    fn keyword_overlap_fallback_skips_unmentioned_folders() {
        let candidates = vec![candidate("产品展示"), candidate("unrelated")];
        let reply = "I think 产品展示 best.";
        let scores = keyword_overlap_fallback(reply, &candidates);
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].folder_path, "/root/产品展示");
    }
}
