//! Gate → execute → audit pipeline shared by every tool kind.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use gate_audit::{AuditLog, InvocationRecord, truncate_for_log};
use gate_policy::{CheckRequest, SecurityGate};
use gate_primitives::AgentId;
use serde_json::{Value, json};
use tracing::{debug, error, warn};

use crate::error::{ToolError, ToolResult};
use crate::registry::{InvocationContext, Tool};

/// Static facts the gate needs about one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateProfile {
    name: String,
    kind: String,
    rate_key: String,
    approved: bool,
    active: bool,
    rate_limit_per_minute: u32,
    target_url: Option<String>,
}

impl GateProfile {
    /// Profile for `name` of kind `kind`, approved and active, with no rate
    /// budget and the rate key `kind:name`.
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
            target_url: None,
        }
    }

    /// Overrides the rate-limit key.
    #[must_use]
    pub fn with_rate_key(mut self, key: impl Into<String>) -> Self {
        self.rate_key = key.into();
        self
    }

    /// Sets approval and lifecycle flags.
    #[must_use]
    pub fn with_state(mut self, approved: bool, active: bool) -> Self {
        self.approved = approved;
        self.active = active;
        self
    }

    /// Sets the rate budget.
    #[must_use]
    pub fn with_rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = limit;
        self
    }

    /// Sets the outbound target.
    #[must_use]
    pub fn with_target_url(mut self, url: Option<String>) -> Self {
        self.target_url = url;
        self
    }

    /// Name recorded in audit entries.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Kind recorded in audit entries.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    fn check_request(&self, input: &str, caller: Option<AgentId>) -> CheckRequest {
        let mut request = CheckRequest::new(&self.kind, &self.name)
            .with_rate_key(&self.rate_key)
            .approved(self.approved)
            .active(self.active)
            .with_rate_limit_per_minute(self.rate_limit_per_minute)
            .with_input(input);
        if let Some(url) = &self.target_url {
            request = request.with_target_url(url);
        }
        if let Some(caller) = caller {
            request = request.with_caller(caller);
        }
        request
    }
}

/// Body of a tool, run only after the gate allowed the call.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Text presented to the gate and recorded as the audit input.
    fn input_text(&self, arguments: &Value) -> String;

    /// Runs the tool.
    ///
    /// # Errors
    ///
    /// Any [`ToolError`] is turned into an error payload by [`GatedTool`].
    async fn execute(&self, context: &InvocationContext, arguments: Value) -> ToolResult<Value>;
}

/// Collaborators shared by every gated tool.
#[derive(Clone)]
pub struct Pipeline {
    gate: Arc<dyn SecurityGate>,
    audit: Arc<dyn AuditLog>,
    audit_max_chars: usize,
}

impl Pipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(gate: Arc<dyn SecurityGate>, audit: Arc<dyn AuditLog>, audit_max_chars: usize) -> Self {
        Self {
            gate,
            audit,
            audit_max_chars,
        }
    }

    /// Audit sink, shared with peer tools for interaction entries.
    #[must_use]
    pub fn audit(&self) -> &Arc<dyn AuditLog> {
        &self.audit
    }
}

/// Wraps an [`Executor`] so that every call is gated and audited exactly once.
pub struct GatedTool {
    profile: GateProfile,
    executor: Arc<dyn Executor>,
    pipeline: Pipeline,
}

impl GatedTool {
    /// Creates a gated tool.
    #[must_use]
    pub fn new(profile: GateProfile, executor: Arc<dyn Executor>, pipeline: Pipeline) -> Self {
        Self {
            profile,
            executor,
            pipeline,
        }
    }

    async fn run(&self, context: &InvocationContext, arguments: Value) -> ToolResult<Value> {
        let execution = self.executor.execute(context, arguments);
        match context.cancel_token() {
            Some(token) => tokio::select! {
                outcome = execution => outcome,
                () = token.cancelled() => Err(ToolError::Cancelled),
            },
            None => execution.await,
        }
    }

    async fn write(&self, record: InvocationRecord) {
        if let Err(err) = self.pipeline.audit.record_invocation(&record).await {
            error!(tool = self.profile.name(), error = %err, "failed to write audit record");
        }
    }
}

#[async_trait]
impl Tool for GatedTool {
    async fn invoke(&self, context: &InvocationContext, arguments: Value) -> Value {
        let started = Instant::now();
        let input = self.executor.input_text(&arguments);
        let audited_input = truncate_for_log(&Value::String(input.clone()), self.pipeline.audit_max_chars);

        let check = self
            .pipeline
            .gate
            .check(&self.profile.check_request(&input, context.caller()))
            .await;
        let base = InvocationRecord::new(
            self.profile.name(),
            self.profile.kind(),
            audited_input,
            check.code(),
        );

        if !check.is_allowed() {
            let denied = ToolError::SecurityDenied {
                code: check.code().to_owned(),
                reason: check.reason().to_owned(),
            };
            self.write(base.failed(None).with_duration(started.elapsed()))
                .await;
            return denied.to_payload();
        }

        match self.run(context, arguments).await {
            Ok(value) => {
                debug!(tool = self.profile.name(), kind = self.profile.kind(), "tool succeeded");
                let output = truncate_for_log(&value, self.pipeline.audit_max_chars);
                self.write(base.succeeded(output).with_duration(started.elapsed()))
                    .await;
                value
            }
            Err(err) => {
                if matches!(err, ToolError::UnknownTemplate { .. }) {
                    error!(tool = self.profile.name(), error = %err, "template skill misconfigured");
                } else {
                    warn!(tool = self.profile.name(), kind = self.profile.kind(), error = %err, "tool failed");
                }
                self.write(
                    base.failed(Some(err.to_string()))
                        .with_duration(started.elapsed()),
                )
                .await;
                err.to_payload()
            }
        }
    }
}

/// Reads a required string argument.
///
/// A bare JSON string is accepted in place of `{field: string}`.
///
/// # Errors
///
/// Returns [`ToolError::InvalidArguments`] when the field is absent or not a
/// string.
pub fn string_argument(arguments: &Value, field: &str) -> ToolResult<String> {
    match arguments {
        Value::String(text) => Ok(text.clone()),
        Value::Object(map) => map
            .get(field)
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or_else(|| ToolError::arguments(format!("expected string field `{field}`"))),
        _ => Err(ToolError::arguments(format!("expected object with `{field}`"))),
    }
}

/// Gate/audit view of a single-field argument object, falling back to the
/// raw JSON when the field is missing.
#[must_use]
pub fn argument_text(arguments: &Value, field: &str) -> String {
    string_argument(arguments, field).unwrap_or_else(|_| arguments.to_string())
}

/// JSON schema for an object with one required string field.
#[must_use]
pub fn single_string_schema(field: &str, description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            field: { "type": "string", "description": description },
        },
        "required": [field],
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::cancel::TurnCancellation;
    use gate_audit::MemoryAuditLog;
    use gate_policy::{PolicyGate, SecurityCheck, codes};

    struct Counting {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl Executor for Counting {
        fn input_text(&self, arguments: &Value) -> String {
            argument_text(arguments, "input")
        }

        async fn execute(&self, _context: &InvocationContext, arguments: Value) -> ToolResult<Value> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ToolError::execution("kaput"));
            }
            Ok(json!({"echo": string_argument(&arguments, "input")?}))
        }
    }

    struct Sleepy;

    #[async_trait]
    impl Executor for Sleepy {
        fn input_text(&self, _arguments: &Value) -> String {
            String::new()
        }

        async fn execute(&self, _context: &InvocationContext, _arguments: Value) -> ToolResult<Value> {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(Value::Null)
        }
    }

    struct DenyAll;

    #[async_trait]
    impl SecurityGate for DenyAll {
        async fn check(&self, _request: &CheckRequest) -> SecurityCheck {
            SecurityCheck::deny(codes::DOMAIN_BLOCKED, "blocked for test")
        }
    }

    fn pipeline(gate: Arc<dyn SecurityGate>, audit: Arc<MemoryAuditLog>) -> Pipeline {
        Pipeline::new(gate, audit, 8)
    }

    #[tokio::test]
    async fn denied_calls_never_execute_and_are_audited_once() {
        let audit = Arc::new(MemoryAuditLog::new());
        let executor = Arc::new(Counting {
            calls: AtomicUsize::new(0),
            fail: false,
        });
        let tool = GatedTool::new(
            GateProfile::new("webhook", "notify"),
            executor.clone(),
            pipeline(Arc::new(DenyAll), audit.clone()),
        );

        let out = tool
            .invoke(&InvocationContext::new(), json!({"input": "hi"}))
            .await;
        assert_eq!(out, json!({"error": "blocked for test"}));
        assert_eq!(executor.calls.load(Ordering::SeqCst), 0);

        let records = audit.invocations().await;
        assert_eq!(records.len(), 1);
        assert!(!records[0].is_success());
        assert_eq!(records[0].security_check_result(), codes::DOMAIN_BLOCKED);
        assert_eq!(records[0].error_message(), None);
    }

    #[tokio::test]
    async fn success_and_failure_are_audited_with_truncation() {
        let audit = Arc::new(MemoryAuditLog::new());
        let gate: Arc<dyn SecurityGate> = Arc::new(PolicyGate::builder().build());

        let ok = GatedTool::new(
            GateProfile::new("code", "echo"),
            Arc::new(Counting {
                calls: AtomicUsize::new(0),
                fail: false,
            }),
            pipeline(gate.clone(), audit.clone()),
        );
        let out = ok
            .invoke(&InvocationContext::new(), json!({"input": "hello world"}))
            .await;
        assert_eq!(out, json!({"echo": "hello world"}));

        let bad = GatedTool::new(
            GateProfile::new("code", "broken"),
            Arc::new(Counting {
                calls: AtomicUsize::new(0),
                fail: true,
            }),
            pipeline(gate, audit.clone()),
        );
        let out = bad.invoke(&InvocationContext::new(), json!({"input": "x"})).await;
        assert_eq!(out, json!({"error": "kaput"}));

        let records = audit.invocations().await;
        assert_eq!(records.len(), 2);
        assert!(records[0].is_success());
        assert_eq!(records[0].input(), "hello wo...[truncated]");
        assert_eq!(records[0].security_check_result(), codes::PASSED);
        assert!(!records[1].is_success());
        assert_eq!(records[1].error_message(), Some("kaput"));
    }

    #[tokio::test]
    async fn cancellation_aborts_and_is_audited() {
        let audit = Arc::new(MemoryAuditLog::new());
        let tool = GatedTool::new(
            GateProfile::new("webhook", "slow"),
            Arc::new(Sleepy),
            pipeline(Arc::new(PolicyGate::builder().build()), audit.clone()),
        );
        let turn = TurnCancellation::new();
        let context = InvocationContext::new().with_cancel(turn.token());

        let call = tool.invoke(&context, json!({}));
        let cancel = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            turn.cancel();
        };
        let (out, ()) = tokio::time::timeout(Duration::from_secs(5), async { tokio::join!(call, cancel) })
            .await
            .expect("cancellation should be prompt");

        assert_eq!(out, json!({"error": "invocation cancelled"}));
        assert_eq!(audit.invocations().await[0].error_message(), Some("invocation cancelled"));
    }

    #[test]
    fn argument_helpers() {
        assert_eq!(string_argument(&json!({"query": "q"}), "query").unwrap(), "q");
        assert_eq!(string_argument(&json!("bare"), "query").unwrap(), "bare");
        assert!(string_argument(&json!({"other": 1}), "query").is_err());
        assert_eq!(argument_text(&json!({"other": 1}), "query"), r#"{"other":1}"#);
        let schema = single_string_schema("input", "Input for the skill");
        assert_eq!(schema["required"], json!(["input"]));
    }
}
