//! Error types for collection_common

use thiserror::Error;

/// Errors raised when parsing or validating collection records
#[derive(Debug, Error, PartialEq)]
pub enum CollectionError {
    /// A string did not name a known enum value (sport, status, card type)
    #[error("unknown {kind}: {value:?}")]
    UnknownValue { kind: &'static str, value: String },
    /// Input record violates a data model rule
    #[error("validation failed: {0}")]
    Validation(String),
}

impl CollectionError {
    pub fn unknown(kind: &'static str, value: &str) -> Self {
        CollectionError::UnknownValue {
            kind,
            value: value.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        CollectionError::Validation(msg.into())
    }
}

/// Result alias for collection_common operations
pub type Result<T> = std::result::Result<T, CollectionError>;
