//! Outbound HTTP plumbing shared by template and webhook skills.

use std::sync::Arc;
use std::time::Duration;

use gate_bridge::{HttpTransport, Method};
use gate_primitives::SkillId;
use gate_registry::CapabilityRegistry;
use serde_json::{Map, Value};

use crate::error::{ToolError, ToolResult};
use crate::secrets;

/// Everything a skill needs to reach the network on its own behalf.
#[derive(Clone)]
pub(crate) struct SkillHttp {
    pub(crate) skill_id: SkillId,
    pub(crate) registry: Arc<dyn CapabilityRegistry>,
    pub(crate) transport: Arc<HttpTransport>,
    pub(crate) deadline: Duration,
}

impl SkillHttp {
    /// Reads configured headers and substitutes secrets, fetching them from
    /// the registry only when a placeholder is present.
    pub(crate) async fn headers(&self, config: &Map<String, Value>) -> ToolResult<Vec<(String, String)>> {
        let headers = secrets::configured_headers(config)?;
        if !secrets::needs_secrets(&headers) {
            return Ok(headers);
        }
        let stored = self.registry.secrets_for(self.skill_id).await?;
        secrets::resolve(&headers, &stored)
    }
}

/// Returns `config.url`, failing with `what` when it is absent or blank.
pub(crate) fn required_url<'a>(config: &'a Map<String, Value>, what: &str) -> ToolResult<&'a str> {
    config
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| ToolError::config(format!("{what} URL not configured")))
}

/// Returns `config.url` if it is a non-empty string.
pub(crate) fn optional_url(config: &Map<String, Value>) -> Option<String> {
    required_url(config, "").ok().map(str::to_owned)
}

/// Parses `config.method`, defaulting to `fallback`.
pub(crate) fn method(config: &Map<String, Value>, fallback: Method) -> ToolResult<Method> {
    match config.get("method") {
        None | Some(Value::Null) => Ok(fallback),
        Some(Value::String(name)) if name.trim().is_empty() => Ok(fallback),
        Some(Value::String(name)) => Method::from_bytes(name.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| ToolError::config(format!("unsupported HTTP method `{name}`"))),
        Some(_) => Err(ToolError::config("`method` must be a string")),
    }
}
