#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use gate_audit::MemoryAuditLog;
use gate_config::GatewayConfig;
use gate_kernel::{GatewayBuilder, ToolAssembler};
use gate_primitives::{
    Agent, AgentId, RemoteServer, Secret, ServerAssignment, ServerId, Skill, SkillAssignment,
    SkillId, SkillKind, SkillStatus,
};
use gate_registry::{CapabilityRegistry, InMemoryRegistry, RegistryError, RegistryResult};
use serde_json::{Value, json};

/// Defaults with the private-network rule off, since test servers bind
/// to loopback.
pub fn loopback_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.policy.block_private_networks = false;
    config
}

pub async fn assembler(
    registry: Arc<dyn CapabilityRegistry>,
    audit: Arc<MemoryAuditLog>,
) -> ToolAssembler {
    GatewayBuilder::new(loopback_config(), registry)
        .audit(audit)
        .build()
        .await
        .expect("gateway builds")
}

pub fn skill(kind: SkillKind, name: &str, config: Value) -> Skill {
    Skill::builder(SkillId::random(), kind)
        .name(name)
        .unwrap()
        .description(format!("{name} skill"))
        .status(SkillStatus::Active)
        .approved(chrono::Utc::now())
        .config(config)
        .unwrap()
        .build()
        .unwrap()
}

pub fn template_skill(name: &str, template_id: &str, config: Value) -> Skill {
    Skill::builder(SkillId::random(), SkillKind::Template)
        .name(name)
        .unwrap()
        .status(SkillStatus::Active)
        .approved(chrono::Utc::now())
        .template_id(template_id)
        .config(config)
        .unwrap()
        .build()
        .unwrap()
}

pub fn code_skill(name: &str) -> Skill {
    skill(SkillKind::Code, name, json!({}))
}

pub fn server(name: &str, url: &str) -> RemoteServer {
    RemoteServer::new(ServerId::random(), name)
        .with_url(url)
        .enabled(true)
        .approved(true)
}

pub fn tools_list(names: &[&str]) -> Value {
    let tools: Vec<Value> = names
        .iter()
        .map(|name| json!({"name": name, "description": format!("remote {name}")}))
        .collect();
    json!({"jsonrpc": "2.0", "id": 1, "result": {"tools": tools}})
}

pub fn agent(name: &str) -> Agent {
    Agent::new(AgentId::random(), name, "test-model")
}

/// Delegates to an in-memory registry, failing selected queries on demand.
#[derive(Default)]
pub struct FlakyRegistry {
    pub inner: InMemoryRegistry,
    pub skills_down: AtomicBool,
    pub servers_down: AtomicBool,
    pub agents_down: AtomicBool,
}

impl FlakyRegistry {
    fn check(flag: &AtomicBool, what: &str) -> RegistryResult<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(RegistryError::unavailable(format!("{what} table offline")));
        }
        Ok(())
    }
}

#[async_trait]
impl CapabilityRegistry for FlakyRegistry {
    async fn list_active_approved(&self) -> RegistryResult<Vec<Skill>> {
        Self::check(&self.skills_down, "skills")?;
        self.inner.list_active_approved().await
    }

    async fn secrets_for(&self, skill: SkillId) -> RegistryResult<Vec<Secret>> {
        self.inner.secrets_for(skill).await
    }

    async fn skill_assignments(&self, agent: AgentId) -> RegistryResult<Vec<SkillAssignment>> {
        self.inner.skill_assignments(agent).await
    }

    async fn list_enabled_approved_servers(&self) -> RegistryResult<Vec<RemoteServer>> {
        Self::check(&self.servers_down, "servers")?;
        self.inner.list_enabled_approved_servers().await
    }

    async fn server_assignments(&self, agent: AgentId) -> RegistryResult<Vec<ServerAssignment>> {
        self.inner.server_assignments(agent).await
    }

    async fn list_agents(&self) -> RegistryResult<Vec<Agent>> {
        Self::check(&self.agents_down, "agents")?;
        self.inner.list_agents().await
    }
}
