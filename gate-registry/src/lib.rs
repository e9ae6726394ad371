//! Capability registry adapter.
//!
//! The gateway never owns configuration entities. It reads them through
//! [`CapabilityRegistry`] at call time, without caching, so tool sets always
//! reflect live approval and assignment state and rotated secrets take effect
//! on the next invocation.

#![warn(missing_docs, clippy::pedantic)]

mod memory;

use async_trait::async_trait;
use gate_primitives::{
    Agent, AgentId, RemoteServer, Secret, ServerAssignment, Skill, SkillAssignment, SkillId,
};
use thiserror::Error;

pub use memory::InMemoryRegistry;

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors surfaced by registry backends.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The backing store could not be reached.
    #[error("registry unavailable: {reason}")]
    Unavailable {
        /// Human-readable context provided by the backend.
        reason: String,
    },
    /// The backing store returned rows that could not be decoded.
    #[error("registry returned malformed data: {reason}")]
    Malformed {
        /// Human-readable context provided by the backend.
        reason: String,
    },
}

impl RegistryError {
    /// Convenience helper to construct availability errors.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Convenience helper to construct decoding errors.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }
}

/// Read-only view over the configuration store.
#[async_trait]
pub trait CapabilityRegistry: Send + Sync {
    /// Lists skills that are approved and active.
    async fn list_active_approved(&self) -> RegistryResult<Vec<Skill>>;

    /// Returns the secrets owned by `skill`.
    async fn secrets_for(&self, skill: SkillId) -> RegistryResult<Vec<Secret>>;

    /// Returns every skill assignment row for `agent`, enabled or not.
    async fn skill_assignments(&self, agent: AgentId) -> RegistryResult<Vec<SkillAssignment>>;

    /// Lists remote servers that are enabled and approved.
    async fn list_enabled_approved_servers(&self) -> RegistryResult<Vec<RemoteServer>>;

    /// Returns every remote-server assignment row for `agent`, enabled or not.
    async fn server_assignments(&self, agent: AgentId) -> RegistryResult<Vec<ServerAssignment>>;

    /// Lists all agents.
    async fn list_agents(&self) -> RegistryResult<Vec<Agent>>;
}
