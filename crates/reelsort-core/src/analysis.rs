//! Analysis result models produced by the analysis orchestrator (C7).

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;

/// High-level summary fields extracted from one or more model replies.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Summary {
    pub description: String,
    pub keywords: Vec<String>,
    pub topics: Vec<String>,
    pub mood: String,
    pub category: String,
}

/// A scene mentioned in the analysis reply, keyed by `(start_time, name)`
/// for union merging across prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneEntry {
    pub start_time: f64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// An object detected/mentioned in the analysis reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObjectEntry {
    pub start_time: f64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Aggregate quality metrics, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema)]
pub struct QualityMetrics {
    pub overall: f64,
    pub detection: f64,
    pub depth: f64,
}

impl QualityMetrics {
    /// Merge by taking the componentwise max, per spec's "aggregated by max".
    pub fn max(self, other: Self) -> Self {
        Self {
            overall: self.overall.max(other.overall),
            detection: self.detection.max(other.detection),
            depth: self.depth.max(other.depth),
        }
    }
}

/// The immutable, cacheable result of analyzing one segment (or a whole
/// video, depending on orchestrator mode).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisResult {
    pub schema_version: u32,
    pub segment_id: String,
    pub summary: Summary,
    pub scenes: Vec<SceneEntry>,
    pub objects: Vec<ObjectEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_features: Option<Vec<String>>,
    pub quality_metrics: QualityMetrics,
    pub model_id: String,
    pub created_at: DateTime<Utc>,
    /// Stable hash of the prompt text and analysis options affecting
    /// outputs; part of the cache key.
    pub prompt_fingerprint: String,
    /// Set when the result was produced via forgiving-repair or
    /// regex-fallback parsing of a malformed model reply.
    #[serde(default)]
    pub parsed_degraded: bool,
}

impl AnalysisResult {
    pub fn new(segment_id: impl Into<String>, model_id: impl Into<String>, prompt_fingerprint: impl Into<String>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            segment_id: segment_id.into(),
            summary: Summary::default(),
            scenes: Vec::new(),
            objects: Vec::new(),
            product_features: None,
            quality_metrics: QualityMetrics::default(),
            model_id: model_id.into(),
            created_at: Utc::now(),
            prompt_fingerprint: prompt_fingerprint.into(),
            parsed_degraded: false,
        }
    }

    /// Merge another result into this one per the orchestrator's merge
    /// contract: scenes/objects unioned by key, summary fields taken from
    /// the first non-empty source, quality metrics aggregated by max.
    pub fn merge(&mut self, other: &AnalysisResult) {
        for scene in &other.scenes {
            let exists = self
                .scenes
                .iter()
                .any(|s| s.name == scene.name && (s.start_time - scene.start_time).abs() < 1e-6);
            if !exists {
                self.scenes.push(scene.clone());
            }
        }
        for obj in &other.objects {
            let exists = self
                .objects
                .iter()
                .any(|o| o.name == obj.name && (o.start_time - obj.start_time).abs() < 1e-6);
            if !exists {
                self.objects.push(obj.clone());
            }
        }
        if self.summary.description.is_empty() {
            self.summary.description = other.summary.description.clone();
        }
        if self.summary.keywords.is_empty() {
            self.summary.keywords = other.summary.keywords.clone();
        }
        if self.summary.topics.is_empty() {
            self.summary.topics = other.summary.topics.clone();
        }
        if self.summary.mood.is_empty() {
            self.summary.mood = other.summary.mood.clone();
        }
        if self.summary.category.is_empty() {
            self.summary.category = other.summary.category.clone();
        }
        if self.product_features.is_none() {
            self.product_features = other.product_features.clone();
        }
        self.quality_metrics = self.quality_metrics.max(other.quality_metrics);
        self.parsed_degraded = self.parsed_degraded || other.parsed_degraded;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_unions_scenes_by_start_time_and_name() {
        let mut a = AnalysisResult::new("seg1", "model-a", "fp1");
        a.scenes.push(SceneEntry {
            start_time: 1.0,
            name: "intro".into(),
            description: None,
        });
        let mut b = AnalysisResult::new("seg1", "model-a", "fp1");
        b.scenes.push(SceneEntry {
            start_time: 1.0,
            name: "intro".into(),
            description: None,
        });
        b.scenes.push(SceneEntry {
            start_time: 5.0,
            name: "outro".into(),
            description: None,
        });
        a.merge(&b);
        assert_eq!(a.scenes.len(), 2);
    }

    #[test]
    fn merge_takes_first_non_empty_summary_field() {
        let mut a = AnalysisResult::new("seg1", "model-a", "fp1");
        let mut b = AnalysisResult::new("seg1", "model-a", "fp1");
        b.summary.description = "from b".into();
        a.merge(&b);
        assert_eq!(a.summary.description, "from b");

        let mut c = AnalysisResult::new("seg1", "model-a", "fp1");
        c.summary.description = "from a".into();
        c.merge(&b);
        assert_eq!(c.summary.description, "from a");
    }

    #[test]
    fn merge_aggregates_quality_by_max() {
        let mut a = AnalysisResult::new("seg1", "model-a", "fp1");
        a.quality_metrics = QualityMetrics { overall: 0.2, detection: 0.9, depth: 0.1 };
        let mut b = AnalysisResult::new("seg1", "model-a", "fp1");
        b.quality_metrics = QualityMetrics { overall: 0.8, detection: 0.1, depth: 0.5 };
        a.merge(&b);
        assert_eq!(a.quality_metrics.overall, 0.8);
        assert_eq!(a.quality_metrics.detection, 0.9);
        assert_eq!(a.quality_metrics.depth, 0.5);
    }
}
