//! Chapter store errors

use core_types::ChapterId;
use thiserror::Error;

/// Chapter store error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Chapter {0} not found")]
    NotFound(ChapterId),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Chapter {0} is not valid UTF-8")]
    InvalidUtf8(ChapterId),

    #[error("Project metadata error: {0}")]
    Metadata(String),

    #[error("Injected failure: {0}")]
    Injected(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Metadata(err.to_string())
    }
}
