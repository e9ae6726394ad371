//! Built-in gate rules.

use std::fmt;
use std::sync::Arc;

use crate::contracts::CheckRequest;
use crate::decision::codes;
use crate::engine::PolicyResult;
use crate::network::{DomainAllowlist, is_private_host};
use crate::rate::RateLimiter;

/// Verdict of a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The rule has no objection.
    Pass,
    /// The rule refuses the invocation.
    Deny {
        /// Result code persisted to the audit record.
        code: String,
        /// Caller-facing explanation.
        reason: String,
    },
}

impl Verdict {
    /// Convenience constructor for denials.
    #[must_use]
    pub fn deny(code: &str, reason: impl Into<String>) -> Self {
        Self::Deny {
            code: code.to_owned(),
            reason: reason.into(),
        }
    }
}

/// One policy dimension evaluated by [`crate::PolicyGate`].
///
/// Rules must be deterministic for a fixed request and policy state.
pub trait GateRule: Send + Sync + fmt::Debug {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Evaluates the rule.
    ///
    /// # Errors
    ///
    /// Any error makes the gate fail closed with `gate_error`.
    fn evaluate(&self, request: &CheckRequest) -> PolicyResult<Verdict>;
}

/// Re-checks approval and lifecycle state at the choke point.
#[derive(Debug, Default, Clone, Copy)]
pub struct ApprovalRule;

impl GateRule for ApprovalRule {
    fn name(&self) -> &str {
        "approval"
    }

    fn evaluate(&self, request: &CheckRequest) -> PolicyResult<Verdict> {
        if !request.is_approved() {
            return Ok(Verdict::deny(
                codes::NOT_APPROVED,
                format!("\"{}\" is not approved", request.name()),
            ));
        }
        if !request.is_active() {
            return Ok(Verdict::deny(
                codes::INACTIVE,
                format!("\"{}\" is not active", request.name()),
            ));
        }
        Ok(Verdict::Pass)
    }
}

/// Caps the caller input length in characters.
#[derive(Debug, Clone, Copy)]
pub struct InputSizeRule {
    max_chars: usize,
}

impl InputSizeRule {
    /// Creates the rule.
    #[must_use]
    pub const fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }
}

impl GateRule for InputSizeRule {
    fn name(&self) -> &str {
        "input_size"
    }

    fn evaluate(&self, request: &CheckRequest) -> PolicyResult<Verdict> {
        if request.input().chars().nth(self.max_chars).is_some() {
            return Ok(Verdict::deny(
                codes::INPUT_TOO_LARGE,
                format!("input exceeds {} characters", self.max_chars),
            ));
        }
        Ok(Verdict::Pass)
    }
}

/// Refuses literal private, loopback, and metadata targets.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrivateNetworkRule;

impl GateRule for PrivateNetworkRule {
    fn name(&self) -> &str {
        "private_network"
    }

    fn evaluate(&self, request: &CheckRequest) -> PolicyResult<Verdict> {
        match request.target_host() {
            Some(host) if is_private_host(&host) => Ok(Verdict::deny(
                codes::PRIVATE_NETWORK_BLOCKED,
                format!("requests to private network host {host} are not allowed"),
            )),
            _ => Ok(Verdict::Pass),
        }
    }
}

/// Restricts outbound targets to an allow-list.
#[derive(Debug, Clone)]
pub struct DomainRule {
    allowlist: DomainAllowlist,
}

impl DomainRule {
    /// Creates the rule.
    #[must_use]
    pub fn new(allowlist: DomainAllowlist) -> Self {
        Self { allowlist }
    }
}

impl GateRule for DomainRule {
    fn name(&self) -> &str {
        "domain_allowlist"
    }

    fn evaluate(&self, request: &CheckRequest) -> PolicyResult<Verdict> {
        match request.target_host() {
            Some(host) if !self.allowlist.permits(&host) => Ok(Verdict::deny(
                codes::DOMAIN_BLOCKED,
                format!("domain {host} is not in the allowed list"),
            )),
            _ => Ok(Verdict::Pass),
        }
    }
}

/// Enforces each subject's per-window call budget.
///
/// Admission is recorded on pass, so this rule must run last.
#[derive(Debug, Clone)]
pub struct RateLimitRule {
    limiter: Arc<RateLimiter>,
}

impl RateLimitRule {
    /// Creates the rule.
    #[must_use]
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

impl GateRule for RateLimitRule {
    fn name(&self) -> &str {
        "rate_limit"
    }

    fn evaluate(&self, request: &CheckRequest) -> PolicyResult<Verdict> {
        let limit = request.rate_limit_per_minute();
        if limit == 0 {
            return Ok(Verdict::Pass);
        }
        if self.limiter.try_acquire(request.rate_key(), limit)? {
            Ok(Verdict::Pass)
        } else {
            Ok(Verdict::deny(
                codes::RATE_LIMITED,
                format!(
                    "rate limit exceeded for \"{}\": {limit} calls per {}s",
                    request.name(),
                    self.limiter.window().as_secs()
                ),
            ))
        }
    }
}
