//! Security gate trait and the rule-based implementation.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::contracts::CheckRequest;
use crate::decision::SecurityCheck;
use crate::network::DomainAllowlist;
use crate::rate::{Clock, RateLimiter, SystemClock};
use crate::rules::{
    ApprovalRule, DomainRule, GateRule, InputSizeRule, PrivateNetworkRule, RateLimitRule, Verdict,
};

/// Errors raised inside policy evaluation. The gate converts every one of
/// them into a `gate_error` denial.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// Shared policy state was poisoned by a panicking thread.
    #[error("policy state poisoned: {what}")]
    StatePoisoned {
        /// Which piece of state.
        what: &'static str,
    },
    /// Backend integration returned an error.
    #[error("policy backend failure: {reason}")]
    Backend {
        /// Human-readable explanation for logging and operators.
        reason: String,
    },
}

/// Result alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Decision point run before every tool body.
///
/// Implementations never fail: internal faults resolve to a denial with
/// code `gate_error`.
#[async_trait]
pub trait SecurityGate: Send + Sync {
    /// Evaluates `request`.
    async fn check(&self, request: &CheckRequest) -> SecurityCheck;
}

/// Ordered list of rules where the first denial wins.
#[derive(Debug)]
pub struct PolicyGate {
    rules: Vec<Box<dyn GateRule>>,
}

impl PolicyGate {
    /// Starts a builder with approval checks and rate limiting enabled.
    #[must_use]
    pub fn builder() -> PolicyGateBuilder {
        PolicyGateBuilder::default()
    }

    /// Rule names in evaluation order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Synchronous evaluation shared by the async trait impl.
    #[must_use]
    pub fn evaluate(&self, request: &CheckRequest) -> SecurityCheck {
        for rule in &self.rules {
            match catch_unwind(AssertUnwindSafe(|| rule.evaluate(request))) {
                Ok(Ok(Verdict::Pass)) => {}
                Ok(Ok(Verdict::Deny { code, reason })) => {
                    warn!(
                        tool = request.name(),
                        kind = request.kind(),
                        rule = rule.name(),
                        code = %code,
                        "security gate denied invocation"
                    );
                    return SecurityCheck::deny(code, reason);
                }
                Ok(Err(err)) => {
                    error!(tool = request.name(), rule = rule.name(), error = %err, "security rule failed");
                    return SecurityCheck::fault(err.to_string());
                }
                Err(_) => {
                    error!(tool = request.name(), rule = rule.name(), "security rule panicked");
                    return SecurityCheck::fault(format!("rule `{}` panicked", rule.name()));
                }
            }
        }

        debug!(tool = request.name(), kind = request.kind(), "security gate passed");
        SecurityCheck::passed()
    }
}

#[async_trait]
impl SecurityGate for PolicyGate {
    async fn check(&self, request: &CheckRequest) -> SecurityCheck {
        self.evaluate(request)
    }
}

/// Builder for [`PolicyGate`].
///
/// Rule order is fixed: approval, input size, private network, domain
/// allow-list, custom rules, rate limit.
#[derive(Debug)]
pub struct PolicyGateBuilder {
    max_input_chars: Option<usize>,
    block_private_networks: bool,
    allowlist: DomainAllowlist,
    rate_window: Duration,
    clock: Arc<dyn Clock>,
    custom: Vec<Box<dyn GateRule>>,
}

impl Default for PolicyGateBuilder {
    fn default() -> Self {
        Self {
            max_input_chars: None,
            block_private_networks: false,
            allowlist: DomainAllowlist::default(),
            rate_window: Duration::from_secs(60),
            clock: Arc::new(SystemClock),
            custom: Vec::new(),
        }
    }
}

impl PolicyGateBuilder {
    /// Caps caller input length in characters.
    #[must_use]
    pub fn max_input_chars(mut self, max: usize) -> Self {
        self.max_input_chars = Some(max);
        self
    }

    /// Refuses literal private and metadata targets.
    #[must_use]
    pub fn block_private_networks(mut self, block: bool) -> Self {
        self.block_private_networks = block;
        self
    }

    /// Restricts outbound targets. An empty list removes the restriction.
    #[must_use]
    pub fn allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowlist = DomainAllowlist::new(domains);
        self
    }

    /// Sets the rate-limit window.
    #[must_use]
    pub fn rate_window(mut self, window: Duration) -> Self {
        self.rate_window = window;
        self
    }

    /// Replaces the clock used for rate accounting.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Appends a custom rule evaluated before rate limiting.
    #[must_use]
    pub fn rule(mut self, rule: impl GateRule + 'static) -> Self {
        self.custom.push(Box::new(rule));
        self
    }

    /// Builds the gate.
    #[must_use]
    pub fn build(self) -> PolicyGate {
        let mut rules: Vec<Box<dyn GateRule>> = vec![Box::new(ApprovalRule)];
        if let Some(max) = self.max_input_chars {
            rules.push(Box::new(InputSizeRule::new(max)));
        }
        if self.block_private_networks {
            rules.push(Box::new(PrivateNetworkRule));
        }
        if !self.allowlist.is_unrestricted() {
            rules.push(Box::new(DomainRule::new(self.allowlist)));
        }
        rules.extend(self.custom);
        rules.push(Box::new(RateLimitRule::new(Arc::new(
            RateLimiter::with_clock(self.rate_window, self.clock),
        ))));
        PolicyGate { rules }
    }
}
