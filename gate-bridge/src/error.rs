//! Errors raised by outbound transport and the remote tool protocol.

use std::time::Duration;

use thiserror::Error;

/// Result alias used by the bridge.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Error type shared by the transport and protocol client.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The target URL could not be parsed or uses an unsupported scheme.
    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A request header could not be encoded.
    #[error("invalid header `{name}`: {reason}")]
    InvalidHeader {
        /// Header name.
        name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Connection-level failure.
    #[error("transport error: {reason}")]
    Transport {
        /// Additional context about the error.
        reason: String,
    },

    /// The deadline elapsed before the exchange completed.
    #[error("request timed out after {}ms", .after.as_millis())]
    Timeout {
        /// Deadline that was applied.
        after: Duration,
    },

    /// Upstream answered with a redirect, which is never followed.
    #[error("redirect rejected: {status}{}", .location.as_deref().map(|l| format!(" -> {l}")).unwrap_or_default())]
    Redirect {
        /// Status code of the redirect response.
        status: u16,
        /// Target advertised by the `Location` header.
        location: Option<String>,
    },

    /// Upstream body exceeded the byte ceiling.
    #[error("response exceeded {limit} bytes")]
    ResponseTooLarge {
        /// Byte ceiling that was applied.
        limit: usize,
    },

    /// Upstream body could not be decoded.
    #[error("malformed response: {reason}")]
    Decode {
        /// Additional context about the failure.
        reason: String,
    },

    /// A remote `tools/call` answered with a non-success status.
    #[error("{tool} call failed: {status}")]
    ToolCall {
        /// Remote tool name.
        tool: String,
        /// HTTP status code.
        status: u16,
    },
}

impl BridgeError {
    /// Convenience constructor for transport failures.
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Convenience constructor for decoding failures.
    #[must_use]
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }
}
