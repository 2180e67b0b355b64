//! Workflow engine (C10): scans input videos and drives each through
//! detection, analysis, matching, and organizing with bounded
//! concurrency and cooperative cancellation.

pub mod config;
pub mod engine;
pub mod error;
pub mod pipeline;

pub use config::WorkflowConfig;
pub use engine::{WorkflowEngine, WorkflowProgressSink, WorkflowSummary};
pub use error::{WorkflowError, WorkflowResult};
pub use pipeline::{process_video, PipelineComponents, VideoOutcome};
