//! Executors for locally defined skills.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use gate_bridge::HttpTransport;
use gate_primitives::{Skill, SkillKind};
use gate_registry::CapabilityRegistry;
use serde_json::{Map, Value};

use crate::code;
use crate::error::ToolResult;
use crate::gated::{Executor, argument_text, string_argument};
use crate::limits::ExecutionLimits;
use crate::outbound::{self, SkillHttp};
use crate::registry::InvocationContext;
use crate::template::TemplateExecutor;
use crate::webhook::WebhookExecutor;

/// Execution strategy chosen once per skill from its kind.
pub(crate) enum SkillExecutor {
    Template(TemplateExecutor),
    Webhook(WebhookExecutor),
    Code { skill_name: String },
}

impl SkillExecutor {
    pub(crate) fn new(
        skill: &Skill,
        registry: Arc<dyn CapabilityRegistry>,
        transport: Arc<HttpTransport>,
        limits: &ExecutionLimits,
    ) -> Self {
        let config = config_object(skill.config());
        let http = SkillHttp {
            skill_id: skill.id(),
            registry,
            transport,
            deadline: skill
                .timeout_ms()
                .filter(|ms| *ms > 0)
                .map_or(limits.default_timeout, Duration::from_millis),
        };
        match skill.kind() {
            SkillKind::Template => Self::Template(TemplateExecutor {
                template_id: skill.template_id().map(str::to_owned),
                config,
                http,
                max_chars: limits.template_max_chars,
            }),
            SkillKind::Webhook => Self::Webhook(WebhookExecutor {
                config,
                http,
                default_max_chars: limits.webhook_max_chars,
            }),
            SkillKind::Code => Self::Code {
                skill_name: skill.name().to_owned(),
            },
        }
    }

    /// Argument field carrying the model's input.
    pub(crate) const fn input_field(kind: SkillKind) -> &'static str {
        match kind {
            SkillKind::Template | SkillKind::Webhook => "input",
            SkillKind::Code => "query",
        }
    }

    /// Parameter description shown to the model.
    pub(crate) const fn input_description(kind: SkillKind) -> &'static str {
        match kind {
            SkillKind::Template | SkillKind::Webhook => "Input for the skill",
            SkillKind::Code => "Query input",
        }
    }

    /// URL the call will reach, for domain and network checks.
    pub(crate) fn target_url(skill: &Skill) -> Option<String> {
        match skill.kind() {
            SkillKind::Template | SkillKind::Webhook => skill
                .config()
                .as_object()
                .and_then(outbound::optional_url),
            SkillKind::Code => None,
        }
    }

    fn field(&self) -> &'static str {
        match self {
            Self::Template(_) => Self::input_field(SkillKind::Template),
            Self::Webhook(_) => Self::input_field(SkillKind::Webhook),
            Self::Code { .. } => Self::input_field(SkillKind::Code),
        }
    }
}

#[async_trait]
impl Executor for SkillExecutor {
    fn input_text(&self, arguments: &Value) -> String {
        argument_text(arguments, self.field())
    }

    async fn execute(&self, _context: &InvocationContext, arguments: Value) -> ToolResult<Value> {
        let input = string_argument(&arguments, self.field())?;
        match self {
            Self::Template(template) => template.run(&input).await.map(Value::String),
            Self::Webhook(webhook) => webhook.run(&input).await.map(Value::String),
            Self::Code { skill_name } => Ok(code::acknowledge(skill_name, &input)),
        }
    }
}

fn config_object(config: &Value) -> Map<String, Value> {
    config.as_object().cloned().unwrap_or_default()
}
