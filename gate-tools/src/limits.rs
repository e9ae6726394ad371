//! Caps and deadlines applied during execution.

use std::time::Duration;

/// Limits shared by every tool built for one assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionLimits {
    /// Cap on text returned by template routines.
    pub template_max_chars: usize,
    /// Default cap on webhook replies; a skill's `maxResponseSize` overrides it.
    pub webhook_max_chars: usize,
    /// Cap on input and output columns of audit records.
    pub audit_max_chars: usize,
    /// Cap on peer responses stored in interaction entries.
    pub interaction_max_chars: usize,
    /// Deadline for outbound calls of skills without their own timeout.
    pub default_timeout: Duration,
    /// Maximum number of peer hops in one ask-chain.
    pub peer_max_depth: usize,
}

impl Default for ExecutionLimits {
    fn default() -> Self {
        Self {
            template_max_chars: 10_000,
            webhook_max_chars: 50_000,
            audit_max_chars: 1_000,
            interaction_max_chars: 2_000,
            default_timeout: Duration::from_secs(30),
            peer_max_depth: 3,
        }
    }
}
