//! Builds gated tool handles from registry records.

use std::sync::Arc;

use gate_audit::AuditLog;
use gate_bridge::{HttpTransport, RemoteToolClient, RemoteToolDescriptor};
use gate_policy::SecurityGate;
use gate_primitives::{
    Agent, AgentId, RemoteServer, Skill, SkillStatus, peer_tool_name, sanitize_tool_name,
};
use gate_registry::CapabilityRegistry;

use crate::gated::{Executor, GateProfile, GatedTool, Pipeline, single_string_schema};
use crate::limits::ExecutionLimits;
use crate::peer::{PeerConversations, PeerExecutor, PeerLineage};
use crate::registry::{ToolHandle, ToolMetadata};
use crate::remote::RemoteExecutor;
use crate::skill::SkillExecutor;

/// Skill type recorded for remote tools.
pub const REMOTE_KIND: &str = "mcp";
/// Skill type recorded for peer tools.
pub const PEER_KIND: &str = "agent";

/// Turns skills, remote tool descriptors, and peers into gated handles that
/// share one gate, audit sink, and transport.
#[derive(Clone)]
pub struct ToolFactory {
    pipeline: Pipeline,
    registry: Arc<dyn CapabilityRegistry>,
    transport: Arc<HttpTransport>,
    remote: Arc<RemoteToolClient>,
    limits: ExecutionLimits,
}

impl ToolFactory {
    /// Creates a factory.
    #[must_use]
    pub fn new(
        gate: Arc<dyn SecurityGate>,
        audit: Arc<dyn AuditLog>,
        registry: Arc<dyn CapabilityRegistry>,
        remote: Arc<RemoteToolClient>,
        transport: Arc<HttpTransport>,
        limits: ExecutionLimits,
    ) -> Self {
        Self {
            pipeline: Pipeline::new(gate, audit, limits.audit_max_chars),
            registry,
            transport,
            remote,
            limits,
        }
    }

    /// Limits applied to every tool.
    #[must_use]
    pub const fn limits(&self) -> &ExecutionLimits {
        &self.limits
    }

    /// Client used for remote listing and calls.
    #[must_use]
    pub fn remote_client(&self) -> &Arc<RemoteToolClient> {
        &self.remote
    }

    /// Handle for a local skill, named after the sanitized skill name.
    #[must_use]
    pub fn skill_tool(&self, skill: &Skill) -> ToolHandle {
        let name = sanitize_tool_name(skill.name());
        let field = SkillExecutor::input_field(skill.kind());
        let metadata = ToolMetadata::new(
            name,
            skill.description(),
            single_string_schema(field, SkillExecutor::input_description(skill.kind())),
        );

        let profile = GateProfile::new(skill.kind().as_str(), skill.name())
            .with_rate_key(format!("skill:{}", skill.id()))
            .with_state(skill.is_approved(), skill.status() == SkillStatus::Active)
            .with_rate_limit_per_minute(skill.rate_limit_per_minute())
            .with_target_url(SkillExecutor::target_url(skill));
        let executor = SkillExecutor::new(
            skill,
            Arc::clone(&self.registry),
            Arc::clone(&self.transport),
            &self.limits,
        );
        self.gated(metadata, profile, Arc::new(executor))
    }

    /// Handle for one tool advertised by `server`.
    #[must_use]
    pub fn remote_tool(&self, server: &RemoteServer, tool: &RemoteToolDescriptor) -> ToolHandle {
        let endpoint = server.url().unwrap_or_default().trim().to_owned();
        let metadata = ToolMetadata::new(
            sanitize_tool_name(&tool.name),
            tool.description_or_name(),
            tool.schema_or_default(),
        );

        let profile = GateProfile::new(REMOTE_KIND, &tool.name)
            .with_rate_key(format!("{REMOTE_KIND}:{}", server.id()))
            .with_state(server.is_approved(), server.is_enabled())
            .with_rate_limit_per_minute(server.rate_limit_per_minute())
            .with_target_url(Some(endpoint.clone()));
        let executor = RemoteExecutor {
            client: Arc::clone(&self.remote),
            endpoint,
            remote_name: tool.name.clone(),
        };
        self.gated(metadata, profile, Arc::new(executor))
    }

    /// Handle letting `lineage`'s current agent ask `peer` a question.
    #[must_use]
    pub fn peer_tool(
        &self,
        peer: &Agent,
        lineage: &PeerLineage,
        conversations: Arc<dyn PeerConversations>,
    ) -> ToolHandle {
        let asker = lineage.current().unwrap_or_else(|| peer.id());
        let metadata = ToolMetadata::new(
            peer_tool_name(peer.name()),
            format!("Ask agent \"{}\" a question and get their response", peer.name()),
            single_string_schema("question", "The question to ask the other agent"),
        );

        let profile = GateProfile::new(PEER_KIND, peer.name())
            .with_rate_key(format!("{PEER_KIND}:{asker}:{}", peer.id()));
        let executor = PeerExecutor {
            asker,
            peer: peer.id(),
            lineage: lineage.clone(),
            max_depth: self.limits.peer_max_depth,
            conversations,
            audit: Arc::clone(self.pipeline.audit()),
            interaction_max_chars: self.limits.interaction_max_chars,
        };
        self.gated(metadata, profile, Arc::new(executor))
    }

    /// Lineage for a turn started by `agent`.
    #[must_use]
    pub fn root_lineage(agent: AgentId) -> PeerLineage {
        PeerLineage::root(agent)
    }

    fn gated(
        &self,
        metadata: ToolMetadata,
        profile: GateProfile,
        executor: Arc<dyn Executor>,
    ) -> ToolHandle {
        let tool = GatedTool::new(profile, executor, self.pipeline.clone());
        ToolHandle::new(metadata, Arc::new(tool))
    }
}
