//! `secret:<key>` header substitution.

use gate_primitives::Secret;
use serde_json::{Map, Value};

use crate::error::{ToolError, ToolResult};

/// Prefix marking a header value as a secret reference.
pub const SECRET_PREFIX: &str = "secret:";

/// Reads a `headers` object from skill configuration.
///
/// # Errors
///
/// Returns [`ToolError::ConfigInvalid`] when `headers` is not an object of
/// strings.
pub fn configured_headers(config: &Map<String, Value>) -> ToolResult<Vec<(String, String)>> {
    match config.get("headers") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(name, value)| {
                value
                    .as_str()
                    .map(|text| (name.clone(), text.to_owned()))
                    .ok_or_else(|| ToolError::config(format!("header `{name}` must be a string")))
            })
            .collect(),
        Some(_) => Err(ToolError::config("`headers` must be an object")),
    }
}

/// Whether any header references a secret.
#[must_use]
pub fn needs_secrets(headers: &[(String, String)]) -> bool {
    headers
        .iter()
        .any(|(_, value)| value.starts_with(SECRET_PREFIX))
}

/// Returns a copy of `headers` with every `secret:<key>` value replaced by
/// the matching secret. The input is left untouched.
///
/// # Errors
///
/// Returns [`ToolError::ConfigInvalid`] naming the key when a referenced
/// secret does not exist, so the placeholder is never sent upstream.
pub fn resolve(headers: &[(String, String)], secrets: &[Secret]) -> ToolResult<Vec<(String, String)>> {
    headers
        .iter()
        .map(|(name, value)| match value.strip_prefix(SECRET_PREFIX) {
            Some(key) => secrets
                .iter()
                .find(|secret| secret.key() == key)
                .map(|secret| (name.clone(), secret.value().expose().to_owned()))
                .ok_or_else(|| ToolError::config(format!("secret `{key}` is not configured"))),
            None => Ok((name.clone(), value.clone())),
        })
        .collect()
}
