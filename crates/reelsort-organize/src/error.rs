//! File organizer error types.

use thiserror::Error;

pub type OrganizeResult<T> = Result<T, OrganizeError>;

#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error("destination already exists and conflict policy is skip: {0}")]
    ConflictSkip(String),

    #[error("could not find a free renamed path for: {0}")]
    RenameExhausted(String),

    #[error("checksum mismatch after copy: {0}")]
    ChecksumMismatch(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}
