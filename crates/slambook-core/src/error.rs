//! Domain errors
//!
//! Typed failures surfaced by validation, import and media loading.
//! The `Store` wraps these in `anyhow` with context; callers that need to
//! react to a specific kind can `downcast_ref::<Error>()`.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::storage::StorageError;

/// Errors produced by slambook operations
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced book, page, question, media item or response is absent
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// A required field is blank or an answer is out of range
    #[error("{field}: {message}")]
    ValidationFailed { field: String, message: String },

    /// Several answers failed validation at once, keyed by question ID
    #[error("{} answer(s) failed validation", .0.len())]
    InvalidAnswers(BTreeMap<String, String>),

    /// Imported content is not a book
    #[error("{0}")]
    InvalidFormat(String),

    /// File type not accepted for this operation
    #[error("Unsupported file type '{found}'. Please use {expected}.")]
    UnsupportedFileType { found: String, expected: String },

    /// File exceeds the upload limit
    #[error("File size too large ({size} bytes). Maximum size is {max} bytes.")]
    FileTooLarge { size: u64, max: u64 },

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Result type for domain operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::not_found("Book", "abc");
        assert_eq!(err.to_string(), "Book not found: abc");

        let err = Error::validation("title", "Title is required");
        assert_eq!(err.to_string(), "title: Title is required");

        let err = Error::UnsupportedFileType {
            found: "txt".to_string(),
            expected: "JSON".to_string(),
        };
        assert!(err.to_string().contains("Please use JSON"));
    }

    #[test]
    fn test_invalid_answers_display() {
        let mut errors = BTreeMap::new();
        errors.insert("q1".to_string(), "This question is required".to_string());
        errors.insert("q2".to_string(), "This question is required".to_string());
        assert_eq!(
            Error::InvalidAnswers(errors).to_string(),
            "2 answer(s) failed validation"
        );
    }
}
