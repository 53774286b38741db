//! Editor errors

use services_chapter_store::StoreError;
use thiserror::Error;

/// Editor error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditorError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("No active chapter")]
    NoActiveChapter,
}

/// Editor result
pub type EditorResult<T> = Result<T, EditorError>;
