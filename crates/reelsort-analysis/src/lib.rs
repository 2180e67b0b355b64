//! Analysis orchestrator (C7): selects prompts per segment, runs them
//! through the cache store (C5) and remote AI client (C6), and merges
//! the structured replies into an `AnalysisResult`.

pub mod error;
pub mod orchestrator;
pub mod prompt_registry;

pub use error::{AnalysisError, OrchestratorResult};
pub use orchestrator::{AnalysisOrchestrator, ProgressSink};
pub use prompt_registry::{PromptKind, PromptRegistry};
