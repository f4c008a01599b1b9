//! Error types for card_tracker

use collection_common::CollectionError;
use std::fmt;

/// Unified error type for card_tracker operations
#[derive(Debug)]
pub enum TrackerError {
    /// HTTP request failed (network error, timeout, etc.)
    Network(reqwest::Error),
    /// Failed to parse JSON
    Parse(serde_json::Error),
    /// Upstream API answered with an error status
    HttpStatus(reqwest::StatusCode),
    /// Database operation failed
    Database(rusqlite::Error),
    /// Image file could not be read or written
    Io(std::io::Error),
    /// Record does not exist (or belongs to another owner)
    NotFound { entity: &'static str, id: String },
    /// Input rejected before touching the store or an upstream API
    Validation(String),
    /// Required API credentials are not configured
    MissingCredentials(&'static str),
}

/// Short alias used throughout the crate
pub type Error = TrackerError;

impl TrackerError {
    pub fn not_found(entity: &'static str, id: &str) -> Self {
        TrackerError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        TrackerError::Validation(msg.into())
    }

    /// Whether the error came from a third-party service rather than from us
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            TrackerError::Network(_) | TrackerError::HttpStatus(_) | TrackerError::Parse(_)
        )
    }
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerError::Network(e) => write!(f, "Network error: {}", e),
            TrackerError::Parse(e) => write!(f, "Parse error: {}", e),
            TrackerError::HttpStatus(status) => write!(f, "HTTP error: {}", status),
            TrackerError::Database(e) => write!(f, "Database error: {}", e),
            TrackerError::Io(e) => write!(f, "I/O error: {}", e),
            TrackerError::NotFound { entity, id } => write!(f, "{} not found: {}", entity, id),
            TrackerError::Validation(msg) => write!(f, "Invalid input: {}", msg),
            TrackerError::MissingCredentials(name) => {
                write!(f, "Credentials not configured: {}", name)
            }
        }
    }
}

impl std::error::Error for TrackerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TrackerError::Network(e) => Some(e),
            TrackerError::Parse(e) => Some(e),
            TrackerError::Database(e) => Some(e),
            TrackerError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        TrackerError::Network(err)
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Parse(err)
    }
}

impl From<rusqlite::Error> for TrackerError {
    fn from(err: rusqlite::Error) -> Self {
        TrackerError::Database(err)
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Io(err)
    }
}

impl From<CollectionError> for TrackerError {
    fn from(err: CollectionError) -> Self {
        TrackerError::Validation(err.to_string())
    }
}

/// Result alias for card_tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;
