//! Strongly typed configuration sections.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Complete gateway configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Outbound HTTP.
    pub http: HttpSettings,
    /// Output caps.
    pub limits: LimitSettings,
    /// Security gate rules.
    pub policy: PolicySettings,
    /// Peer invocation.
    pub peers: PeerSettings,
    /// Audit destination.
    pub audit: AuditSettings,
    /// Log output.
    pub telemetry: TelemetrySettings,
}

impl GatewayConfig {
    /// Rejects zero timeouts, zero caps, and a zero peer depth.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending key.
    pub fn validate(&self) -> ConfigResult<()> {
        let checks: [(&'static str, bool); 10] = [
            ("http.default_timeout_ms", self.http.default_timeout_ms == 0),
            ("http.list_timeout_ms", self.http.list_timeout_ms == 0),
            ("limits.template_max_chars", self.limits.template_max_chars == 0),
            ("limits.webhook_max_chars", self.limits.webhook_max_chars == 0),
            ("limits.remote_max_bytes", self.limits.remote_max_bytes == 0),
            ("limits.audit_max_chars", self.limits.audit_max_chars == 0),
            ("limits.interaction_max_chars", self.limits.interaction_max_chars == 0),
            ("policy.max_input_chars", self.policy.max_input_chars == 0),
            ("policy.rate_window_secs", self.policy.rate_window_secs == 0),
            ("peers.max_depth", self.peers.max_depth == 0),
        ];
        match checks.into_iter().find(|(_, zero)| *zero) {
            Some((field, _)) => Err(ConfigError::Invalid {
                field,
                reason: "must be greater than zero",
            }),
            None => Ok(()),
        }
    }
}

/// Outbound HTTP settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    /// Deadline for capabilities without their own timeout budget.
    pub default_timeout_ms: u64,
    /// Deadline for remote `tools/list`.
    pub list_timeout_ms: u64,
    /// User agent sent on every request.
    pub user_agent: Option<String>,
}

impl HttpSettings {
    /// [`Self::default_timeout_ms`] as a duration.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// [`Self::list_timeout_ms`] as a duration.
    #[must_use]
    pub const fn list_timeout(&self) -> Duration {
        Duration::from_millis(self.list_timeout_ms)
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            default_timeout_ms: 30_000,
            list_timeout_ms: 10_000,
            user_agent: None,
        }
    }
}

/// Output caps, in characters unless stated otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitSettings {
    /// Template routine output.
    pub template_max_chars: usize,
    /// Webhook replies without a `maxResponseSize`.
    pub webhook_max_chars: usize,
    /// Remote server replies, in bytes.
    pub remote_max_bytes: usize,
    /// Audit record input and output.
    pub audit_max_chars: usize,
    /// Peer responses stored in interaction entries.
    pub interaction_max_chars: usize,
}

impl Default for LimitSettings {
    fn default() -> Self {
        Self {
            template_max_chars: 10_000,
            webhook_max_chars: 50_000,
            remote_max_bytes: 1024 * 1024,
            audit_max_chars: 1_000,
            interaction_max_chars: 2_000,
        }
    }
}

/// Security gate settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    /// Outbound host allow-list; empty means unrestricted.
    pub allowed_domains: Vec<String>,
    /// Refuse loopback, private, link-local, and metadata targets.
    pub block_private_networks: bool,
    /// Longest accepted input.
    pub max_input_chars: usize,
    /// Sliding window for per-minute budgets.
    pub rate_window_secs: u64,
}

impl PolicySettings {
    /// [`Self::rate_window_secs`] as a duration.
    #[must_use]
    pub const fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window_secs)
    }
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            allowed_domains: Vec::new(),
            block_private_networks: true,
            max_input_chars: 20_000,
            rate_window_secs: 60,
        }
    }
}

/// Peer invocation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerSettings {
    /// Maximum hops in one ask-chain.
    pub max_depth: usize,
}

impl Default for PeerSettings {
    fn default() -> Self {
        Self { max_depth: 3 }
    }
}

/// Audit destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditSettings {
    /// NDJSON journal file; audit entries go to the log when unset.
    pub journal_path: Option<PathBuf>,
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    /// Include event targets in output.
    pub with_target: bool,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            filter: "info".to_owned(),
            with_target: true,
        }
    }
}
