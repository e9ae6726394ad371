//! Core shared types for the skill gateway.

#![warn(missing_docs, clippy::pedantic)]

mod agent;
mod error;
mod ids;
pub mod naming;
mod secret;
mod server;
mod skill;
pub mod text;

/// Agents, their status, and assignment edges.
pub use agent::{Agent, AgentMode, AgentStatus, Assignment};
/// Error type and result alias shared across the gateway.
pub use error::{Error, Result};
/// Unique identifiers for gateway entities.
pub use ids::{AgentId, ServerId, SkillId};
/// Tool identifier sanitization.
pub use naming::{peer_tool_name, sanitize_tool_name};
/// Secrets owned by skills.
pub use secret::{Secret, SecretValue};
/// Remote tool server descriptors.
pub use server::RemoteServer;
/// Skill descriptors and supporting builders.
pub use skill::{Skill, SkillBuilder, SkillKind, SkillStatus};
/// Character-based capping.
pub use text::{CappedText, TRUNCATION_SUFFIX};

/// Assignment edge from an agent to a skill.
pub type SkillAssignment = Assignment<SkillId>;
/// Assignment edge from an agent to a remote server.
pub type ServerAssignment = Assignment<ServerId>;
