//! Collects skills, remote tools, and peers into one gated tool set.

use std::sync::Arc;

use futures::future::join_all;
use gate_primitives::{AgentId, RemoteServer, ServerId, SkillId};
use gate_registry::CapabilityRegistry;
use gate_tools::{PeerConversations, PeerLineage, ToolFactory, ToolSet};
use tracing::{debug, info, warn};

use crate::error::KernelResult;
use crate::scope::Scope;

/// Builds the tool set handed to a model for one turn.
///
/// Nothing is cached: approval, assignment, and server state are read fresh
/// on every call. Sources are merged in the order skills, remote tools,
/// peers; a later tool whose sanitized name collides with an earlier one
/// replaces it.
#[derive(Clone)]
pub struct ToolAssembler {
    registry: Arc<dyn CapabilityRegistry>,
    factory: ToolFactory,
    peers: Option<Arc<dyn PeerConversations>>,
}

impl ToolAssembler {
    /// Creates an assembler without peer tools.
    #[must_use]
    pub fn new(registry: Arc<dyn CapabilityRegistry>, factory: ToolFactory) -> Self {
        Self {
            registry,
            factory,
            peers: None,
        }
    }

    /// Enables peer tools, answered through `conversations`.
    #[must_use]
    pub fn with_peer_conversations(mut self, conversations: Arc<dyn PeerConversations>) -> Self {
        self.peers = Some(conversations);
        self
    }

    /// Factory used to build individual handles.
    #[must_use]
    pub fn factory(&self) -> &ToolFactory {
        &self.factory
    }

    /// Assembles tools for `agent`, or the full approved universe when
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::KernelError::Registry`] when skills or assignments
    /// cannot be read. Server and agent listing failures only drop those
    /// sources.
    pub async fn assemble(&self, agent: Option<AgentId>) -> KernelResult<ToolSet> {
        match agent {
            Some(agent) => self.assemble_in(&PeerLineage::root(agent)).await,
            None => self.collect(None, None).await,
        }
    }

    /// Assembles tools for the current agent of `lineage`, the form used
    /// when a peer answers a question inside an ask-chain.
    ///
    /// # Errors
    ///
    /// See [`ToolAssembler::assemble`].
    pub async fn assemble_in(&self, lineage: &PeerLineage) -> KernelResult<ToolSet> {
        self.collect(lineage.current(), Some(lineage)).await
    }

    async fn collect(
        &self,
        agent: Option<AgentId>,
        lineage: Option<&PeerLineage>,
    ) -> KernelResult<ToolSet> {
        let (skills, remote, peers) = tokio::join!(
            self.collect_skills(agent),
            self.collect_remote(agent),
            self.collect_peers(lineage),
        );

        let mut tools = skills?;
        let skill_count = tools.len();
        tools.merge(remote?);
        tools.merge(peers);

        info!(
            agent = ?agent,
            skills = skill_count,
            total = tools.len(),
            "assembled tool set"
        );
        Ok(tools)
    }

    async fn collect_skills(&self, agent: Option<AgentId>) -> KernelResult<ToolSet> {
        let scope = match agent {
            Some(agent) => Scope::<SkillId>::from_assignments(&self.registry.skill_assignments(agent).await?),
            None => Scope::Unscoped,
        };

        let mut tools = ToolSet::new();
        for skill in self.registry.list_active_approved().await? {
            if !skill.is_callable() {
                warn!(skill = skill.name(), "registry returned a skill that is not callable; skipping");
                continue;
            }
            if scope.permits(&skill.id()) {
                tools.insert(self.factory.skill_tool(&skill));
            }
        }
        Ok(tools)
    }

    async fn collect_remote(&self, agent: Option<AgentId>) -> KernelResult<ToolSet> {
        let servers = match self.registry.list_enabled_approved_servers().await {
            Ok(servers) => servers,
            Err(err) => {
                warn!(error = %err, "remote servers unavailable; skipping remote tools");
                return Ok(ToolSet::new());
            }
        };
        let scope = match agent {
            Some(agent) => Scope::<ServerId>::from_assignments(&self.registry.server_assignments(agent).await?),
            None => Scope::Unscoped,
        };

        let selected: Vec<RemoteServer> = servers
            .into_iter()
            .filter(RemoteServer::is_callable)
            .filter(|server| scope.permits(&server.id()))
            .collect();

        let listings = join_all(selected.iter().map(|server| self.list_server(server))).await;
        let mut tools = ToolSet::new();
        for listing in listings {
            tools.merge(listing);
        }
        Ok(tools)
    }

    async fn list_server(&self, server: &RemoteServer) -> ToolSet {
        let mut tools = ToolSet::new();
        let Some(endpoint) = server.url() else {
            return tools;
        };
        match self.factory.remote_client().list_tools(endpoint.trim()).await {
            Ok(descriptors) => {
                debug!(server = server.name(), count = descriptors.len(), "remote tools listed");
                for descriptor in &descriptors {
                    tools.insert(self.factory.remote_tool(server, descriptor));
                }
            }
            Err(err) => {
                warn!(server = server.name(), error = %err, "remote server unavailable; skipping");
            }
        }
        tools
    }

    async fn collect_peers(&self, lineage: Option<&PeerLineage>) -> ToolSet {
        let mut tools = ToolSet::new();
        let (Some(lineage), Some(conversations)) = (lineage, &self.peers) else {
            return tools;
        };
        let Some(asker) = lineage.current() else {
            return tools;
        };

        match self.registry.list_agents().await {
            Ok(agents) => {
                for peer in agents.iter().filter(|peer| peer.is_addressable_by(asker)) {
                    tools.insert(self.factory.peer_tool(peer, lineage, Arc::clone(conversations)));
                }
            }
            Err(err) => warn!(error = %err, "agents unavailable; skipping peer tools"),
        }
        tools
    }
}
