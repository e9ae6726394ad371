//! Remote tool server descriptors.

use serde::{Deserialize, Serialize};

use crate::ids::ServerId;

/// A third-party server exposing tools over the JSON-RPC `tools/*` methods.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteServer {
    id: ServerId,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    enabled: bool,
    approved: bool,
    #[serde(default = "default_rate_limit")]
    rate_limit_per_minute: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    health_status: Option<String>,
}

fn default_rate_limit() -> u32 {
    60
}

impl RemoteServer {
    /// Creates a disabled, unapproved server without an endpoint.
    #[must_use]
    pub fn new(id: ServerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            url: None,
            enabled: false,
            approved: false,
            rate_limit_per_minute: default_rate_limit(),
            health_status: None,
        }
    }

    /// Sets the endpoint URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Sets the enabled flag.
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Sets the approval flag.
    #[must_use]
    pub fn approved(mut self, approved: bool) -> Self {
        self.approved = approved;
        self
    }

    /// Sets the per-minute invocation budget applied to each of its tools.
    #[must_use]
    pub fn with_rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = limit;
        self
    }

    /// Records the last observed health status.
    #[must_use]
    pub fn with_health_status(mut self, status: impl Into<String>) -> Self {
        self.health_status = Some(status.into());
        self
    }

    /// Returns the server identifier.
    #[must_use]
    pub const fn id(&self) -> ServerId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the endpoint URL, if configured.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Returns the enabled flag.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the approval flag.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        self.approved
    }

    /// Returns the per-minute invocation budget.
    #[must_use]
    pub const fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Returns the last observed health status.
    #[must_use]
    pub fn health_status(&self) -> Option<&str> {
        self.health_status.as_deref()
    }

    /// A server is callable only when approved, enabled, and addressable.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.approved && self.enabled && self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
    }
}
