//! Request contract evaluated by the security gate.

use gate_primitives::AgentId;
use http::Uri;
use serde::{Deserialize, Serialize};

/// Everything the gate needs to know about one invocation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckRequest {
    name: String,
    kind: String,
    rate_key: String,
    approved: bool,
    active: bool,
    rate_limit_per_minute: u32,
    input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    target_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    caller: Option<AgentId>,
}

impl CheckRequest {
    /// Creates a request for the tool `name` of kind `kind`.
    ///
    /// The subject is assumed approved and active with no rate budget until
    /// told otherwise; the rate-limit key defaults to `kind:name`.
    #[must_use]
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        let kind = kind.into();
        let name = name.into();
        Self {
            rate_key: format!("{kind}:{name}"),
            name,
            kind,
            approved: true,
            active: true,
            rate_limit_per_minute: 0,
            input: String::new(),
            target_url: None,
            caller: None,
        }
    }

    /// Overrides the key under which rate budget is tracked.
    #[must_use]
    pub fn with_rate_key(mut self, key: impl Into<String>) -> Self {
        self.rate_key = key.into();
        self
    }

    /// Sets the approval flag.
    #[must_use]
    pub fn approved(mut self, approved: bool) -> Self {
        self.approved = approved;
        self
    }

    /// Sets the lifecycle flag.
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Sets the rate budget; zero disables rate limiting for this subject.
    #[must_use]
    pub fn with_rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = limit;
        self
    }

    /// Sets the caller's input payload.
    #[must_use]
    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = input.into();
        self
    }

    /// Sets the URL this invocation will reach.
    #[must_use]
    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = Some(url.into());
        self
    }

    /// Records the calling agent.
    #[must_use]
    pub fn with_caller(mut self, caller: AgentId) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Tool name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool kind (`template`, `webhook`, `code`, `mcp`, `agent`).
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Rate-limit key.
    #[must_use]
    pub fn rate_key(&self) -> &str {
        &self.rate_key
    }

    /// Approval flag.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        self.approved
    }

    /// Lifecycle flag.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Rate budget per window.
    #[must_use]
    pub const fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Caller input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Target URL, when the invocation performs outbound HTTP.
    #[must_use]
    pub fn target_url(&self) -> Option<&str> {
        self.target_url.as_deref()
    }

    /// Calling agent, if known.
    #[must_use]
    pub const fn caller(&self) -> Option<AgentId> {
        self.caller
    }

    /// Lower-cased host of [`CheckRequest::target_url`], if it parses.
    #[must_use]
    pub fn target_host(&self) -> Option<String> {
        let uri = self.target_url.as_deref()?.parse::<Uri>().ok()?;
        let host = uri.host()?;
        let host = host
            .strip_prefix('[')
            .and_then(|inner| inner.strip_suffix(']'))
            .unwrap_or(host);
        Some(host.trim_end_matches('.').to_ascii_lowercase())
    }
}
