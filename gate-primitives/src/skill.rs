//! Skill (capability) descriptors consumed read-only by the gateway.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::ids::SkillId;

const MAX_NAME_LEN: usize = 256;

/// Execution strategy backing a skill.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillKind {
    /// Built-in routine selected by a template identifier.
    Template,
    /// Outbound HTTP call to a configured endpoint.
    Webhook,
    /// Code-defined skill (acknowledgment stand-in).
    Code,
}

impl SkillKind {
    /// Returns the label persisted in audit records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Template => "template",
            Self::Webhook => "webhook",
            Self::Code => "code",
        }
    }
}

impl fmt::Display for SkillKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "template" => Ok(Self::Template),
            "webhook" => Ok(Self::Webhook),
            "code" => Ok(Self::Code),
            other => Err(Error::UnknownVariant {
                kind: "skill kind",
                value: other.to_owned(),
            }),
        }
    }
}

/// Lifecycle state of a skill.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillStatus {
    /// Awaiting review.
    #[default]
    Pending,
    /// Live and invokable once approved.
    Active,
    /// Switched off by an operator.
    Inactive,
}

/// Describes a skill registered in the capability store.
///
/// The declarative `config` never carries secret material; secrets live in
/// [`crate::Secret`] rows owned by the skill.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    id: SkillId,
    name: String,
    description: String,
    kind: SkillKind,
    status: SkillStatus,
    approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    approved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    config: Value,
    rate_limit_per_minute: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    template_id: Option<String>,
}

impl Skill {
    /// Starts building a skill descriptor.
    #[must_use]
    pub fn builder(id: SkillId, kind: SkillKind) -> SkillBuilder {
        SkillBuilder {
            id,
            kind,
            name: None,
            description: String::new(),
            status: SkillStatus::Pending,
            approved_at: None,
            config: Value::Object(serde_json::Map::new()),
            rate_limit_per_minute: 60,
            timeout_ms: None,
            template_id: None,
        }
    }

    /// Returns the skill identifier.
    #[must_use]
    pub const fn id(&self) -> SkillId {
        self.id
    }

    /// Human-friendly skill name (unsanitized).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Description shown to the language model.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Execution strategy.
    #[must_use]
    pub const fn kind(&self) -> SkillKind {
        self.kind
    }

    /// Lifecycle state.
    #[must_use]
    pub const fn status(&self) -> SkillStatus {
        self.status
    }

    /// Whether the approval workflow signed off on the skill.
    #[must_use]
    pub const fn is_approved(&self) -> bool {
        self.approved
    }

    /// Time of approval, if approved.
    #[must_use]
    pub const fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    /// Declarative configuration.
    #[must_use]
    pub fn config(&self) -> &Value {
        &self.config
    }

    /// Invocation budget per minute.
    #[must_use]
    pub const fn rate_limit_per_minute(&self) -> u32 {
        self.rate_limit_per_minute
    }

    /// Optional deadline budget in milliseconds.
    #[must_use]
    pub const fn timeout_ms(&self) -> Option<u64> {
        self.timeout_ms
    }

    /// Template identifier for template skills.
    #[must_use]
    pub fn template_id(&self) -> Option<&str> {
        self.template_id.as_deref()
    }

    /// A skill is callable only when approved and active.
    #[must_use]
    pub fn is_callable(&self) -> bool {
        self.approved && self.status == SkillStatus::Active
    }
}

/// Builder for [`Skill`].
#[derive(Debug)]
pub struct SkillBuilder {
    id: SkillId,
    kind: SkillKind,
    name: Option<String>,
    description: String,
    status: SkillStatus,
    approved_at: Option<DateTime<Utc>>,
    config: Value,
    rate_limit_per_minute: u32,
    timeout_ms: Option<u64>,
    template_id: Option<String>,
}

impl SkillBuilder {
    /// Sets the display name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSkill`] if the name is empty or too long.
    pub fn name(mut self, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidSkill {
                reason: "name cannot be empty".into(),
            });
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(Error::InvalidSkill {
                reason: format!("name length must be <= {MAX_NAME_LEN}"),
            });
        }
        self.name = Some(name);
        Ok(self)
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the lifecycle state.
    #[must_use]
    pub fn status(mut self, status: SkillStatus) -> Self {
        self.status = status;
        self
    }

    /// Marks the skill approved at the supplied instant.
    #[must_use]
    pub fn approved(mut self, at: DateTime<Utc>) -> Self {
        self.approved_at = Some(at);
        self
    }

    /// Replaces the declarative configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSkill`] if the configuration is not a JSON object.
    pub fn config(mut self, config: Value) -> Result<Self> {
        if !config.is_object() {
            return Err(Error::InvalidSkill {
                reason: "config must be a JSON object".into(),
            });
        }
        self.config = config;
        Ok(self)
    }

    /// Sets the per-minute invocation budget.
    #[must_use]
    pub fn rate_limit_per_minute(mut self, limit: u32) -> Self {
        self.rate_limit_per_minute = limit;
        self
    }

    /// Sets the deadline budget in milliseconds.
    #[must_use]
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Sets the template identifier.
    #[must_use]
    pub fn template_id(mut self, template_id: impl Into<String>) -> Self {
        self.template_id = Some(template_id.into());
        self
    }

    /// Finalises the skill descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSkill`] if the name is missing.
    pub fn build(self) -> Result<Skill> {
        let name = self.name.ok_or_else(|| Error::InvalidSkill {
            reason: "name must be provided".into(),
        })?;

        Ok(Skill {
            id: self.id,
            name,
            description: self.description,
            kind: self.kind,
            status: self.status,
            approved: self.approved_at.is_some(),
            approved_at: self.approved_at,
            config: self.config,
            rate_limit_per_minute: self.rate_limit_per_minute,
            timeout_ms: self.timeout_ms,
            template_id: self.template_id,
        })
    }
}
