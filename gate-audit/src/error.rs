//! Error types for audit sinks.

use serde_json::Error as SerdeError;
use thiserror::Error;

/// Errors emitted by audit sinks.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Underlying I/O failure while writing or reading journal files.
    #[error("i/o error: {source}")]
    Io {
        /// Source [`std::io::Error`].
        #[from]
        source: std::io::Error,
    },
    /// Serialization or deserialization error.
    #[error("serialization error: {source}")]
    Serialization {
        /// Source [`serde_json::Error`].
        #[from]
        source: SerdeError,
    },
}

/// Result type alias for audit operations.
pub type AuditResult<T> = Result<T, AuditError>;
