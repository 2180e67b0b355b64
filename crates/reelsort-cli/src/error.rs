//! Top-level CLI error boundary: maps every crate's error type to the
//! exit codes spec.md §6 defines.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("input error: {0}")]
    Input(String),

    #[error(transparent)]
    Media(#[from] reelsort_media::MediaError),

    #[error(transparent)]
    Cache(#[from] reelsort_cache::CacheError),

    #[error(transparent)]
    Ai(#[from] reelsort_ai::AiClientError),

    #[error(transparent)]
    Analysis(#[from] reelsort_analysis::AnalysisError),

    #[error(transparent)]
    Match(#[from] reelsort_match::MatchError),

    #[error(transparent)]
    Organize(#[from] reelsort_organize::OrganizeError),

    #[error(transparent)]
    Workflow(#[from] reelsort_workflow::WorkflowError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cancelled")]
    Cancelled,

    #[error("partial failure: {succeeded} succeeded, {failed} failed")]
    PartialFailure { succeeded: usize, failed: usize },

    /// Context-wrapped input/IO failures (malformed JSON documents, etc.)
    /// that need an `anyhow::Context` chain to explain which file and
    /// which step failed, rather than a bare `io`/`json` error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Exit code per spec.md §6: 0 success; 2 configuration error; 3
    /// input error; 4 partial failure; 5 cancelled; 1 catastrophic.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Config(_) => 2,
            CliError::Input(_) => 3,
            CliError::PartialFailure { .. } => 4,
            CliError::Cancelled => 5,
            CliError::Media(reelsort_media::MediaError::FileNotFound(_)) => 3,
            CliError::Media(reelsort_media::MediaError::InvalidVideo(_)) => 3,
            CliError::Media(reelsort_media::MediaError::Cancelled) => 5,
            CliError::Ai(reelsort_ai::AiClientError::Cancelled) => 5,
            _ => 1,
        }
    }
}
