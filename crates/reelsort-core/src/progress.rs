//! Progress event shapes emitted by the orchestrator (C7) and workflow
//! engine (C10). Mirrors the teacher's tagged-enum websocket message
//! convention, adapted to a plain callback sink instead of a socket.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A step-boundary progress event from the analysis orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisProgress {
    pub phase: String,
    pub step_index: usize,
    pub total_steps: usize,
    pub message: String,
}

/// Workflow-level phase, in the order the engine moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowPhase {
    Scanning,
    Analyzing,
    Matching,
    Organizing,
    Complete,
}

/// A progress event emitted by the workflow engine.
///
/// Emitted at least once per completed video and whenever `percent`
/// advances by at least 1%. Emission is thread-safe; listeners are called
/// with no locks held.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkflowProgress {
    pub phase: WorkflowPhase,
    pub step: String,
    /// In `[0, 100]`.
    pub percent: f64,
    pub processed: usize,
    pub total: usize,
}
