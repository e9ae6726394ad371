//! Gate decision type.

use serde::{Deserialize, Serialize};

/// Result codes persisted verbatim into audit records.
pub mod codes {
    /// Every rule passed.
    pub const PASSED: &str = "passed";
    /// Subject has not been approved.
    pub const NOT_APPROVED: &str = "not_approved";
    /// Subject is approved but not active.
    pub const INACTIVE: &str = "inactive";
    /// Caller input exceeds the size ceiling.
    pub const INPUT_TOO_LARGE: &str = "input_too_large";
    /// Target host is loopback, private, link-local, or a metadata endpoint.
    pub const PRIVATE_NETWORK_BLOCKED: &str = "private_network_blocked";
    /// Target host is outside the domain allow-list.
    pub const DOMAIN_BLOCKED: &str = "domain_blocked";
    /// Subject exhausted its rate budget.
    pub const RATE_LIMITED: &str = "rate_limited";
    /// The gate failed internally and closed.
    pub const GATE_ERROR: &str = "gate_error";
}

/// Outcome of one gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityCheck {
    allowed: bool,
    reason: String,
    code: String,
}

impl SecurityCheck {
    /// Allow decision.
    #[must_use]
    pub fn passed() -> Self {
        Self {
            allowed: true,
            reason: String::new(),
            code: codes::PASSED.to_owned(),
        }
    }

    /// Deny decision with a result code and a caller-facing reason.
    #[must_use]
    pub fn deny(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: reason.into(),
            code: code.into(),
        }
    }

    /// Fail-closed decision for internal faults.
    #[must_use]
    pub fn fault(detail: impl AsRef<str>) -> Self {
        Self::deny(
            codes::GATE_ERROR,
            format!("security check failed: {}", detail.as_ref()),
        )
    }

    /// Whether the invocation may proceed.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Caller-facing reason; empty when allowed.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Result code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_codes() {
        let passed = SecurityCheck::passed();
        assert!(passed.is_allowed());
        assert_eq!(passed.code(), codes::PASSED);

        let denied = SecurityCheck::deny(codes::DOMAIN_BLOCKED, "nope");
        assert!(!denied.is_allowed());
        assert_eq!(denied.reason(), "nope");

        let fault = SecurityCheck::fault("lock poisoned");
        assert!(!fault.is_allowed());
        assert_eq!(fault.code(), codes::GATE_ERROR);
        assert!(fault.reason().contains("lock poisoned"));
    }
}
