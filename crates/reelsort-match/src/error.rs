//! Folder matcher error types.

use thiserror::Error;

pub type MatcherResult<T> = Result<T, MatchError>;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("scan root does not exist: {0}")]
    ScanRootMissing(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Ai(#[from] reelsort_ai::AiClientError),
}
