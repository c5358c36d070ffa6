//! Error types for vocab-core.

use thiserror::Error;

/// Result type alias using WordListError.
pub type Result<T> = std::result::Result<T, WordListError>;

/// Errors that can occur while importing a plain-text word list.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WordListError {
    #[error("word list contains no words")]
    EmptyWordList,
}
