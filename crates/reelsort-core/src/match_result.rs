//! Folder match results produced by the folder matcher (C8).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::SCHEMA_VERSION;

/// The organizer action implied by a match's confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Move,
    Copy,
    Link,
    Ignore,
}

impl Action {
    /// Map a confidence score to an action per the non-decreasing step
    /// function of spec.md section 4.8.5: `>= 0.8` move, `>= 0.6` copy,
    /// `>= 0.4` link, else ignore.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence >= 0.8 {
            Action::Move
        } else if confidence >= 0.6 {
            Action::Copy
        } else if confidence >= 0.4 {
            Action::Link
        } else {
            Action::Ignore
        }
    }
}

/// One folder's match result for a given segment's analysis.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MatchResult {
    pub schema_version: u32,
    pub segment_id: String,
    pub folder_path: String,
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub rule_score: f64,
    pub semantic_score: f64,
    pub action: Action,
}

impl MatchResult {
    pub fn new(segment_id: impl Into<String>, folder_path: impl Into<String>, rule_score: f64, semantic_score: f64, reasons: Vec<String>) -> Self {
        let confidence = rule_score.max(semantic_score).min(1.0);
        Self {
            schema_version: SCHEMA_VERSION,
            segment_id: segment_id.into(),
            folder_path: folder_path.into(),
            confidence,
            reasons,
            rule_score,
            semantic_score,
            action: Action::from_confidence(confidence),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_mapping_is_non_decreasing_step_function() {
        assert_eq!(Action::from_confidence(1.0), Action::Move);
        assert_eq!(Action::from_confidence(0.8), Action::Move);
        assert_eq!(Action::from_confidence(0.79), Action::Copy);
        assert_eq!(Action::from_confidence(0.6), Action::Copy);
        assert_eq!(Action::from_confidence(0.59), Action::Link);
        assert_eq!(Action::from_confidence(0.4), Action::Link);
        assert_eq!(Action::from_confidence(0.39), Action::Ignore);
        assert_eq!(Action::from_confidence(0.0), Action::Ignore);
    }

    #[test]
    fn confidence_is_max_of_rule_and_semantic() {
        let m = MatchResult::new("seg1", "/a/b", 0.3, 0.7, vec![]);
        assert!((m.confidence - 0.7).abs() < 1e-9);
    }
}
