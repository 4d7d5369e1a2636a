//! Store Errors
//!
//! Error types for key-value store operations.

use std::path::PathBuf;

/// Errors that can occur in the key-value store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backing file could not be read or written
    #[error("Store I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored document does not have the expected shape
    #[error("Invalid document under key {key}: {reason}")]
    InvalidDocument { key: String, reason: String },

    /// Journal left by an interrupted commit could not be replayed
    #[error("Journal recovery failed: {0}")]
    Recovery(String),
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_document(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidDocument {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if the error came from the backing medium rather than the data
    pub fn is_io(&self) -> bool {
        matches!(self, StoreError::Io { .. })
    }
}
