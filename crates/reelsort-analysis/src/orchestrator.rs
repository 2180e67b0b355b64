//! Analysis orchestrator (C7): runs one or more prompts per segment
//! through the cache (C5) and AI client (C6), merging structured replies
//! into a single `AnalysisResult`.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Duration as ChronoDuration;
use reelsort_ai::{AiClient, GenerationParams};
use reelsort_cache::CacheStore;
use reelsort_core::{AnalysisProgress, AnalysisResult, ObjectEntry, QualityMetrics, SceneEntry, Summary};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::{error, warn};

use crate::error::{AnalysisError, OrchestratorResult};
use crate::prompt_registry::{PromptKind, PromptRegistry};

/// Progress sink for orchestrator step boundaries; matches
/// `{phase, stepIndex, totalSteps, message}` per spec.
pub type ProgressSink = Arc<dyn Fn(AnalysisProgress) + Send + Sync>;

const DEFAULT_CACHE_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const MODEL_ID: &str = "gemini-2.5-flash";

/// Orchestrates a set of prompts over one segment's content.
pub struct AnalysisOrchestrator {
    cache: CacheStore,
    ai: Arc<AiClient>,
    prompts: Arc<PromptRegistry>,
}

impl AnalysisOrchestrator {
    pub fn new(cache: CacheStore, ai: Arc<AiClient>, prompts: Arc<PromptRegistry>) -> Self {
        Self { cache, ai, prompts }
    }

    /// Analyze one segment using `prompt_kinds`, merging all successful
    /// prompt results into a single `AnalysisResult`. Fails with
    /// `AnalysisUnavailable` only when every prompt fails.
    pub async fn analyze_segment(
        &self,
        segment_id: &str,
        content_description: &str,
        input_checksum: &str,
        prompt_kinds: &[PromptKind],
        cancel: &watch::Receiver<bool>,
        progress: &ProgressSink,
    ) -> OrchestratorResult<AnalysisResult> {
        let total_steps = prompt_kinds.len();
        let mut merged: Option<AnalysisResult> = None;
        let mut succeeded = 0usize;

        for (step_index, kind) in prompt_kinds.iter().enumerate() {
            progress(AnalysisProgress {
                phase: "analyzing".to_string(),
                step_index,
                total_steps,
                message: format!("running {} prompt", kind.name()),
            });

            match self
                .run_one_prompt(segment_id, content_description, input_checksum, *kind, cancel)
                .await
            {
                Ok(result) => {
                    succeeded += 1;
                    match &mut merged {
                        Some(existing) => existing.merge(&result),
                        None => merged = Some(result),
                    }
                }
                Err(e) => {
                    error!(segment_id, prompt = kind.name(), error = %e, "prompt failed, continuing");
                }
            }
        }

        progress(AnalysisProgress {
            phase: "analyzing".to_string(),
            step_index: total_steps,
            total_steps,
            message: "complete".to_string(),
        });

        if succeeded == 0 {
            return Err(AnalysisError::AnalysisUnavailable(segment_id.to_string()));
        }

        Ok(merged.expect("succeeded > 0 implies merged is Some"))
    }

    async fn run_one_prompt(
        &self,
        segment_id: &str,
        content_description: &str,
        input_checksum: &str,
        kind: PromptKind,
        cancel: &watch::Receiver<bool>,
    ) -> OrchestratorResult<AnalysisResult> {
        let mut placeholders = HashMap::new();
        placeholders.insert("contentDescription", content_description.to_string());
        let prompt_text = self.prompts.render(kind, &placeholders)?;

        let prompt_fingerprint = fingerprint(&prompt_text);
        let cache_key = cache_key(input_checksum, &prompt_fingerprint, "{}");

        if let reelsort_core::CacheLookup::Hit(value) = self.cache.lookup(&cache_key, input_checksum).await? {
            if let Ok(result) = serde_json::from_value::<AnalysisResult>(value) {
                return Ok(result);
            }
            warn!(segment_id, prompt = kind.name(), "cached payload did not match AnalysisResult shape, recomputing");
        }

        let reply = self
            .ai
            .generate(&prompt_text, &[], &GenerationParams::default(), cancel)
            .await?;

        let result = to_analysis_result(segment_id, &prompt_fingerprint, reply.parsed.value.clone(), reply.parsed.degraded);

        let payload = serde_json::to_value(&result)?;
        self.cache
            .put(&cache_key, &payload, input_checksum, ChronoDuration::seconds(DEFAULT_CACHE_TTL_SECONDS))
            .await?;

        Ok(result)
    }
}

/// Cache key per spec §3: `hash(inputChecksum, promptFingerprint, optionsCanonicalJSON)`.
fn cache_key(input_checksum: &str, prompt_fingerprint: &str, options_canonical_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input_checksum.as_bytes());
    hasher.update(prompt_fingerprint.as_bytes());
    hasher.update(options_canonical_json.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn fingerprint(prompt_text: &str) -> String {
    format!("{:x}", Sha256::digest(prompt_text.as_bytes()))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyShape {
    #[serde(default)]
    description: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    topics: Vec<String>,
    #[serde(default)]
    mood: String,
    #[serde(default)]
    category: String,
    #[serde(default)]
    scenes: Vec<ReplyScene>,
    #[serde(default)]
    objects: Vec<ReplyObject>,
    #[serde(default)]
    product_features: Option<Vec<String>>,
    #[serde(default)]
    quality_metrics: Option<ReplyQuality>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyScene {
    start_time: f64,
    name: String,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyObject {
    start_time: f64,
    name: String,
    #[serde(default)]
    confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReplyQuality {
    #[serde(default)]
    overall: f64,
    #[serde(default)]
    detection: f64,
    #[serde(default)]
    depth: f64,
}

fn to_analysis_result(segment_id: &str, prompt_fingerprint: &str, raw: serde_json::Value, degraded: bool) -> AnalysisResult {
    let shape: ReplyShape = serde_json::from_value(raw).unwrap_or_default();

    let mut result = AnalysisResult::new(segment_id, MODEL_ID, prompt_fingerprint);
    result.summary = Summary {
        description: shape.description,
        keywords: shape.keywords,
        topics: shape.topics,
        mood: shape.mood,
        category: shape.category,
    };
    result.scenes = shape
        .scenes
        .into_iter()
        .map(|s| SceneEntry {
            start_time: s.start_time,
            name: s.name,
            description: s.description,
        })
        .collect();
    result.objects = shape
        .objects
        .into_iter()
        .map(|o| ObjectEntry {
            start_time: o.start_time,
            name: o.name,
            confidence: o.confidence,
        })
        .collect();
    result.product_features = shape.product_features;
    result.quality_metrics = shape
        .quality_metrics
        .map(|q| QualityMetrics {
            overall: q.overall,
            detection: q.detection,
            depth: q.depth,
        })
        .unwrap_or_default();
    result.parsed_degraded = degraded;

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_key_is_stable_for_same_inputs() {
        let a = cache_key("chk", "fp", "{}");
        let b = cache_key("chk", "fp", "{}");
        assert_eq!(a, b);
    }

    #[test]
    fn cache_key_differs_on_fingerprint_change() {
        let a = cache_key("chk", "fp1", "{}");
        let b = cache_key("chk", "fp2", "{}");
        assert_ne!(a, b);
    }

    #[test]
    fn to_analysis_result_handles_missing_fields_gracefully() {
        let raw = serde_json::json!({"description": "a scene"});
        let result = to_analysis_result("seg1", "fp", raw, false);
        assert_eq!(result.summary.description, "a scene");
        assert!(result.scenes.is_empty());
    }
}
