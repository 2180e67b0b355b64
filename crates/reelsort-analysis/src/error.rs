//! Analysis orchestrator error types.

use thiserror::Error;

pub type OrchestratorResult<T> = Result<T, AnalysisError>;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("no prompt succeeded for segment {0}")]
    AnalysisUnavailable(String),

    #[error("unknown prompt kind: {0}")]
    UnknownPrompt(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Cache(#[from] reelsort_cache::CacheError),

    #[error(transparent)]
    Ai(#[from] reelsort_ai::AiClientError),
}
