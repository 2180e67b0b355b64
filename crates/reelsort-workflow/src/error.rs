//! Workflow engine error types.

use thiserror::Error;

pub type WorkflowResult<T> = Result<T, WorkflowError>;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("video processing cancelled")]
    Cancelled,

    #[error(transparent)]
    Media(#[from] reelsort_media::MediaError),

    #[error(transparent)]
    Cache(#[from] reelsort_cache::CacheError),

    #[error(transparent)]
    Analysis(#[from] reelsort_analysis::AnalysisError),

    #[error(transparent)]
    Match(#[from] reelsort_match::MatchError),

    #[error(transparent)]
    Organize(#[from] reelsort_organize::OrganizeError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
