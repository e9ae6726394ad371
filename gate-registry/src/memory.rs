//! In-process registry backed by insertion-ordered tables.

use async_trait::async_trait;
use gate_primitives::{
    Agent, AgentId, Assignment, RemoteServer, Secret, ServerAssignment, ServerId, Skill,
    SkillAssignment, SkillId,
};
use tokio::sync::RwLock;
use tracing::debug;

use crate::{CapabilityRegistry, RegistryResult};

#[derive(Debug, Default)]
struct Tables {
    skills: Vec<Skill>,
    secrets: Vec<Secret>,
    skill_assignments: Vec<SkillAssignment>,
    servers: Vec<RemoteServer>,
    server_assignments: Vec<ServerAssignment>,
    agents: Vec<Agent>,
}

/// Registry that keeps every table in memory.
///
/// Rows are returned in insertion order; replacing a row keeps its position.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    tables: RwLock<Tables>,
}

impl InMemoryRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a skill.
    pub async fn upsert_skill(&self, skill: Skill) {
        let mut tables = self.tables.write().await;
        upsert(&mut tables.skills, skill, |a, b| a.id() == b.id());
    }

    /// Stores a secret, replacing any previous value under the same key.
    pub async fn put_secret(&self, secret: Secret) {
        let mut tables = self.tables.write().await;
        upsert(&mut tables.secrets, secret, |a, b| {
            a.skill_id() == b.skill_id() && a.key() == b.key()
        });
    }

    /// Assigns a skill to an agent (idempotent; re-enables a disabled edge).
    pub async fn assign_skill(&self, agent: AgentId, skill: SkillId) {
        self.set_skill_assignment(agent, skill, true).await;
    }

    /// Creates or toggles a skill assignment edge.
    pub async fn set_skill_assignment(&self, agent: AgentId, skill: SkillId, enabled: bool) {
        let mut tables = self.tables.write().await;
        upsert(
            &mut tables.skill_assignments,
            Assignment::new(agent, skill, enabled),
            |a, b| a.agent_id() == b.agent_id() && a.target() == b.target(),
        );
    }

    /// Inserts or replaces a remote server.
    pub async fn upsert_server(&self, server: RemoteServer) {
        let mut tables = self.tables.write().await;
        upsert(&mut tables.servers, server, |a, b| a.id() == b.id());
    }

    /// Assigns a remote server to an agent (idempotent; re-enables a disabled edge).
    pub async fn assign_server(&self, agent: AgentId, server: ServerId) {
        self.set_server_assignment(agent, server, true).await;
    }

    /// Creates or toggles a remote-server assignment edge.
    pub async fn set_server_assignment(&self, agent: AgentId, server: ServerId, enabled: bool) {
        let mut tables = self.tables.write().await;
        upsert(
            &mut tables.server_assignments,
            Assignment::new(agent, server, enabled),
            |a, b| a.agent_id() == b.agent_id() && a.target() == b.target(),
        );
    }

    /// Inserts or replaces an agent.
    pub async fn upsert_agent(&self, agent: Agent) {
        let mut tables = self.tables.write().await;
        upsert(&mut tables.agents, agent, |a, b| a.id() == b.id());
    }
}

fn upsert<T>(rows: &mut Vec<T>, row: T, same: impl Fn(&T, &T) -> bool) {
    if let Some(slot) = rows.iter_mut().find(|existing| same(existing, &row)) {
        *slot = row;
    } else {
        rows.push(row);
    }
}

#[async_trait]
impl CapabilityRegistry for InMemoryRegistry {
    async fn list_active_approved(&self) -> RegistryResult<Vec<Skill>> {
        let tables = self.tables.read().await;
        let skills: Vec<Skill> = tables
            .skills
            .iter()
            .filter(|skill| skill.is_callable())
            .cloned()
            .collect();
        debug!(count = skills.len(), "listed active approved skills");
        Ok(skills)
    }

    async fn secrets_for(&self, skill: SkillId) -> RegistryResult<Vec<Secret>> {
        let tables = self.tables.read().await;
        Ok(tables
            .secrets
            .iter()
            .filter(|secret| secret.skill_id() == skill)
            .cloned()
            .collect())
    }

    async fn skill_assignments(&self, agent: AgentId) -> RegistryResult<Vec<SkillAssignment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .skill_assignments
            .iter()
            .filter(|edge| edge.agent_id() == agent)
            .copied()
            .collect())
    }

    async fn list_enabled_approved_servers(&self) -> RegistryResult<Vec<RemoteServer>> {
        let tables = self.tables.read().await;
        Ok(tables
            .servers
            .iter()
            .filter(|server| server.is_enabled() && server.is_approved())
            .cloned()
            .collect())
    }

    async fn server_assignments(&self, agent: AgentId) -> RegistryResult<Vec<ServerAssignment>> {
        let tables = self.tables.read().await;
        Ok(tables
            .server_assignments
            .iter()
            .filter(|edge| edge.agent_id() == agent)
            .copied()
            .collect())
    }

    async fn list_agents(&self) -> RegistryResult<Vec<Agent>> {
        let tables = self.tables.read().await;
        Ok(tables.agents.clone())
    }
}
