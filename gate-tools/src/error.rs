//! Errors produced while executing tools.

use gate_bridge::BridgeError;
use gate_registry::RegistryError;
use serde_json::{Value, json};
use thiserror::Error;

/// Result alias for tool operations.
pub type ToolResult<T> = Result<T, ToolError>;

/// Errors produced by tool lookup and execution.
///
/// At the gated boundary every variant becomes an `{"error": "<message>"}`
/// payload for the model; none of them escape as a failure of the gateway.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The security gate refused the call.
    #[error("{reason}")]
    SecurityDenied {
        /// Gate result code.
        code: String,
        /// Caller-facing reason.
        reason: String,
    },

    /// Outbound transport failure: unreachable, timed out, redirected, or
    /// an oversized or malformed reply.
    #[error(transparent)]
    Upstream(#[from] BridgeError),

    /// Upstream answered with a non-success status.
    #[error("{context}: {status}")]
    UpstreamStatus {
        /// What was being attempted, e.g. `webhook failed`.
        context: &'static str,
        /// HTTP status code.
        status: u16,
    },

    /// The registry could not provide secrets for this call.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// A required configuration field is missing or malformed.
    #[error("invalid configuration: {reason}")]
    ConfigInvalid {
        /// What is wrong.
        reason: String,
    },

    /// The template identifier names no built-in routine.
    #[error("Unknown template: {id}")]
    UnknownTemplate {
        /// Offending identifier.
        id: String,
    },

    /// The turn this call belonged to was abandoned.
    #[error("invocation cancelled")]
    Cancelled,

    /// A peer question would create a cycle or exceed the depth limit.
    #[error("peer invocation refused: {reason}")]
    PeerLimit {
        /// Why the question was refused.
        reason: String,
    },

    /// Arguments supplied by the model do not match the tool schema.
    #[error("invalid arguments: {reason}")]
    InvalidArguments {
        /// What is missing or wrong.
        reason: String,
    },

    /// Tool execution failed.
    #[error("{reason}")]
    Execution {
        /// Human-readable error returned by the tool implementation.
        reason: String,
    },

    /// Requested tool does not exist.
    #[error("tool `{name}` is not registered")]
    UnknownTool {
        /// Name of the missing tool.
        name: String,
    },
}

impl ToolError {
    /// Creates an execution error from the supplied reason.
    #[must_use]
    pub fn execution(reason: impl Into<String>) -> Self {
        Self::Execution {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigInvalid {
            reason: reason.into(),
        }
    }

    /// Creates an argument error.
    #[must_use]
    pub fn arguments(reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            reason: reason.into(),
        }
    }

    /// Renders the error as the payload returned to the model.
    #[must_use]
    pub fn to_payload(&self) -> Value {
        json!({ "error": self.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payloads_carry_the_message() {
        let denied = ToolError::SecurityDenied {
            code: "rate_limited".into(),
            reason: "slow down".into(),
        };
        assert_eq!(denied.to_payload(), json!({"error": "slow down"}));

        let status = ToolError::UpstreamStatus {
            context: "webhook failed",
            status: 502,
        };
        assert_eq!(status.to_string(), "webhook failed: 502");

        let remote = ToolError::from(BridgeError::ToolCall {
            tool: "weather".into(),
            status: 500,
        });
        assert_eq!(remote.to_payload(), json!({"error": "weather call failed: 500"}));
    }
}
