//! Persisted audit record shapes.

use std::time::Duration;

use chrono::Utc;
use gate_primitives::{AgentId, CappedText};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Renders `value` for a log column, capped at `max_chars` characters.
///
/// Strings are taken verbatim; anything else is JSON-serialised first.
#[must_use]
pub fn truncate_for_log(value: &Value, max_chars: usize) -> String {
    let text = match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    CappedText::new(text, max_chars).into_string()
}

/// One invocation attempt, denied or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationRecord {
    skill_name: String,
    skill_type: String,
    input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output: Option<String>,
    success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    security_check_result: String,
    duration_ms: u64,
    timestamp: i64,
}

impl InvocationRecord {
    /// Starts a failed record with no output; use [`Self::succeeded`] or
    /// [`Self::failed`] to finish it.
    #[must_use]
    pub fn new(
        skill_name: impl Into<String>,
        skill_type: impl Into<String>,
        input: impl Into<String>,
        security_check_result: impl Into<String>,
    ) -> Self {
        Self {
            skill_name: skill_name.into(),
            skill_type: skill_type.into(),
            input: input.into(),
            output: None,
            success: false,
            error_message: None,
            security_check_result: security_check_result.into(),
            duration_ms: 0,
            timestamp: now_millis(),
        }
    }

    /// Marks the record successful with `output`.
    #[must_use]
    pub fn succeeded(mut self, output: impl Into<String>) -> Self {
        self.success = true;
        self.output = Some(output.into());
        self.error_message = None;
        self
    }

    /// Marks the record failed. Denials carry no message.
    #[must_use]
    pub fn failed(mut self, message: Option<String>) -> Self {
        self.success = false;
        self.output = None;
        self.error_message = message;
        self
    }

    /// Sets the elapsed time.
    #[must_use]
    pub fn with_duration(mut self, elapsed: Duration) -> Self {
        self.duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Registry name of the skill, server tool, or peer, before sanitization.
    #[must_use]
    pub fn skill_name(&self) -> &str {
        &self.skill_name
    }

    /// Tool kind (`template`, `webhook`, `code`, `mcp`, `agent`).
    #[must_use]
    pub fn skill_type(&self) -> &str {
        &self.skill_type
    }

    /// Truncated input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Truncated output, present on success.
    #[must_use]
    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    /// Whether the invocation succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.success
    }

    /// Failure message, if any.
    #[must_use]
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Gate result code.
    #[must_use]
    pub fn security_check_result(&self) -> &str {
        &self.security_check_result
    }

    /// Elapsed milliseconds.
    #[must_use]
    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    /// Epoch milliseconds at which the attempt started.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// One agent asking another a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentInteraction {
    from_agent_id: AgentId,
    to_agent_id: AgentId,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thread_id: Option<String>,
    timestamp: i64,
}

impl AgentInteraction {
    /// Creates an interaction entry for `content` sent from `from` to `to`.
    #[must_use]
    pub fn new(from: AgentId, to: AgentId, content: impl Into<String>) -> Self {
        Self {
            from_agent_id: from,
            to_agent_id: to,
            content: content.into(),
            response: None,
            thread_id: None,
            timestamp: now_millis(),
        }
    }

    /// Attaches the (already truncated) response.
    #[must_use]
    pub fn with_response(mut self, response: impl Into<String>) -> Self {
        self.response = Some(response.into());
        self
    }

    /// Attaches the sub-conversation identifier.
    #[must_use]
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// Asking agent.
    #[must_use]
    pub const fn from_agent_id(&self) -> AgentId {
        self.from_agent_id
    }

    /// Asked agent.
    #[must_use]
    pub const fn to_agent_id(&self) -> AgentId {
        self.to_agent_id
    }

    /// Question text.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Response text, if one arrived.
    #[must_use]
    pub fn response(&self) -> Option<&str> {
        self.response.as_deref()
    }

    /// Sub-conversation identifier.
    #[must_use]
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Epoch milliseconds.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Journal line: either kind of entry, tagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditEntry {
    /// Tool invocation attempt.
    Invocation(InvocationRecord),
    /// Agent-to-agent question.
    Interaction(AgentInteraction),
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_primitives::TRUNCATION_SUFFIX;
    use serde_json::json;

    #[test]
    fn truncation_serialises_non_strings() {
        assert_eq!(truncate_for_log(&json!("plain"), 10), "plain");
        assert_eq!(truncate_for_log(&json!({"a": 1}), 100), r#"{"a":1}"#);
        assert_eq!(
            truncate_for_log(&json!("abcdef"), 3),
            format!("abc{TRUNCATION_SUFFIX}")
        );
    }

    #[test]
    fn invocation_record_uses_camel_case_contract() {
        let record = InvocationRecord::new("Weather", "webhook", "hi", "passed")
            .succeeded("sunny")
            .with_duration(Duration::from_millis(42));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["skillName"], "Weather");
        assert_eq!(value["skillType"], "webhook");
        assert_eq!(value["securityCheckResult"], "passed");
        assert_eq!(value["durationMs"], 42);
        assert_eq!(value["success"], true);
        assert!(value.get("errorMessage").is_none());
        assert!(value["timestamp"].as_i64().unwrap() > 1_600_000_000_000);
    }

    #[test]
    fn failed_records_drop_output() {
        let record = InvocationRecord::new("x", "code", "q", "rate_limited").failed(None);
        assert!(!record.is_success());
        assert_eq!(record.output(), None);
        assert_eq!(record.error_message(), None);
    }
}
