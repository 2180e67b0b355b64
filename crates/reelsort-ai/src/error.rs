//! Remote AI client error types.

use thiserror::Error;

pub type AiClientResult<T> = Result<T, AiClientError>;

#[derive(Debug, Error)]
pub enum AiClientError {
    #[error("failed to configure AI client: {0}")]
    ConfigError(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("request timed out after {0} seconds")]
    Timeout(u64),

    #[error("request cancelled")]
    Cancelled,

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("all models failed; last error: {0}")]
    AllModelsFailed(String),
}

impl AiClientError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn request_failed(msg: impl Into<String>) -> Self {
        Self::RequestFailed(msg.into())
    }
}
