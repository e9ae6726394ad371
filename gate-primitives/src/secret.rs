//! Secrets owned by skills.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::SkillId;

/// Opaque secret value. `Debug` and `Display` never reveal the content.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct SecretValue(String);

impl SecretValue {
    /// Wraps a raw secret value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the raw value. Only call at substitution time.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretValue(***)")
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl Serialize for SecretValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("***")
    }
}

/// Key/value secret belonging to exactly one skill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Secret {
    skill_id: SkillId,
    key: String,
    value: SecretValue,
}

impl Secret {
    /// Creates a secret row.
    #[must_use]
    pub fn new(skill_id: SkillId, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            skill_id,
            key: key.into(),
            value: SecretValue::new(value),
        }
    }

    /// Returns the owning skill.
    #[must_use]
    pub const fn skill_id(&self) -> SkillId {
        self.skill_id
    }

    /// Returns the lookup key referenced by `secret:<key>` placeholders.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the wrapped value.
    #[must_use]
    pub fn value(&self) -> &SecretValue {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formatting_redacts_value() {
        let secret = Secret::new(SkillId::random(), "apiKey", "abc123");
        let debug = format!("{secret:?}");
        assert!(!debug.contains("abc123"));
        assert!(!serde_json::to_string(&secret).unwrap().contains("abc123"));
        assert_eq!(secret.value().expose(), "abc123");
    }
}
