//! Agents addressable by the peer-invocation bridge.

use serde::{Deserialize, Serialize};

use crate::ids::AgentId;

/// Runtime status of an agent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    /// Actively processing.
    Running,
    /// Paused by an operator.
    Paused,
    /// Waiting for work.
    #[default]
    Idle,
    /// Failed; excluded from peer addressing.
    Error,
}

/// Operating mode of an agent.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentMode {
    /// Runs autonomously.
    #[default]
    Auto,
    /// Does not act until resumed.
    Paused,
    /// Completes one task then stops.
    SingleTask,
    /// Pauses after each step for confirmation.
    ThinkToContinue,
}

/// Agent record as stored by the configuration service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    id: AgentId,
    name: String,
    model: String,
    #[serde(default)]
    status: AgentStatus,
    #[serde(default)]
    mode: AgentMode,
}

impl Agent {
    /// Creates an idle agent in automatic mode.
    #[must_use]
    pub fn new(id: AgentId, name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            model: model.into(),
            status: AgentStatus::Idle,
            mode: AgentMode::Auto,
        }
    }

    /// Sets the runtime status.
    #[must_use]
    pub fn with_status(mut self, status: AgentStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the operating mode.
    #[must_use]
    pub fn with_mode(mut self, mode: AgentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Returns the agent identifier.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the selected model.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns the runtime status.
    #[must_use]
    pub const fn status(&self) -> AgentStatus {
        self.status
    }

    /// Returns the operating mode.
    #[must_use]
    pub const fn mode(&self) -> AgentMode {
        self.mode
    }

    /// Whether `asker` may address this agent as a peer.
    #[must_use]
    pub fn is_addressable_by(&self, asker: AgentId) -> bool {
        self.id != asker && self.status != AgentStatus::Error
    }
}

/// Allow-list edge binding an agent to a skill or remote server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment<T> {
    agent_id: AgentId,
    target: T,
    enabled: bool,
}

impl<T: Copy> Assignment<T> {
    /// Creates an assignment edge.
    #[must_use]
    pub const fn new(agent_id: AgentId, target: T, enabled: bool) -> Self {
        Self {
            agent_id,
            target,
            enabled,
        }
    }

    /// Returns the agent side of the edge.
    #[must_use]
    pub const fn agent_id(&self) -> AgentId {
        self.agent_id
    }

    /// Returns the assigned skill or server identifier.
    #[must_use]
    pub const fn target(&self) -> T {
        self.target
    }

    /// Returns whether the edge is switched on.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }
}
