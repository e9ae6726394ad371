//! Shared error definitions for gateway primitives.

use thiserror::Error;
use uuid::Error as UuidError;

/// Result alias used throughout the gateway primitives.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing primitive types.
#[derive(Debug, Error)]
pub enum Error {
    /// The provided identifier could not be parsed.
    #[error("invalid id: {source}")]
    InvalidId {
        /// Source parsing error from the UUID library.
        #[from]
        source: UuidError,
    },

    /// Skill definition failed validation.
    #[error("invalid skill: {reason}")]
    InvalidSkill {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Value did not name a known variant.
    #[error("unknown {kind} `{value}`")]
    UnknownVariant {
        /// Name of the enumeration being parsed.
        kind: &'static str,
        /// The offending value.
        value: String,
    },
}
