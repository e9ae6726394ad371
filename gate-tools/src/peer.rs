//! Agent-to-agent questions.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use gate_audit::{AgentInteraction, AuditLog};
use gate_primitives::AgentId;
use gate_primitives::text::take_chars;
use serde_json::Value;
use tracing::{debug, error};

use crate::error::{ToolError, ToolResult};
use crate::gated::{Executor, argument_text, string_argument};
use crate::registry::InvocationContext;

/// Chain of agents in the current ask-chain, oldest first.
#[derive(Clone, PartialEq, Eq)]
pub struct PeerLineage {
    chain: Vec<AgentId>,
}

impl PeerLineage {
    /// Lineage of a turn started directly by `agent`.
    #[must_use]
    pub fn root(agent: AgentId) -> Self {
        Self { chain: vec![agent] }
    }

    /// Agents in the chain, oldest first.
    #[must_use]
    pub fn agents(&self) -> &[AgentId] {
        &self.chain
    }

    /// Number of peer hops taken so far.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.chain.len().saturating_sub(1)
    }

    /// The agent currently asking.
    #[must_use]
    pub fn current(&self) -> Option<AgentId> {
        self.chain.last().copied()
    }

    /// Lineage after one more hop to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::PeerLimit`] when `to` is already in the chain or
    /// the hop would exceed `max_depth`.
    pub fn extend(&self, to: AgentId, max_depth: usize) -> ToolResult<Self> {
        if self.chain.contains(&to) {
            return Err(ToolError::PeerLimit {
                reason: format!("agent {to} is already part of this conversation"),
            });
        }
        if self.depth() >= max_depth {
            return Err(ToolError::PeerLimit {
                reason: format!("maximum ask depth of {max_depth} reached"),
            });
        }
        let mut chain = self.chain.clone();
        chain.push(to);
        Ok(Self { chain })
    }
}

impl fmt::Debug for PeerLineage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.chain.iter().map(ToString::to_string)).finish()
    }
}

/// Question routed to another agent.
#[derive(Debug, Clone)]
pub struct PeerRequest {
    /// Asking agent.
    pub from: AgentId,
    /// Answering agent.
    pub to: AgentId,
    /// The question.
    pub question: String,
    /// Lineage including `to`; the peer's tools must be assembled with it.
    pub lineage: PeerLineage,
}

/// Complete answer from a peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerReply {
    /// Conversation created for the question, if the host tracks one.
    pub thread_id: Option<String>,
    /// Answer text.
    pub text: String,
}

impl PeerReply {
    /// Reply without a thread.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            thread_id: None,
            text: text.into(),
        }
    }

    /// Sets the thread id.
    #[must_use]
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }
}

/// Host runtime hook that runs a fresh sub-conversation with a peer.
#[async_trait]
pub trait PeerConversations: Send + Sync {
    /// Sends the question and waits for the complete answer.
    ///
    /// # Errors
    ///
    /// Any failure is returned to the asking model as an error payload.
    async fn ask(&self, request: PeerRequest) -> ToolResult<PeerReply>;
}

pub(crate) struct PeerExecutor {
    pub(crate) asker: AgentId,
    pub(crate) peer: AgentId,
    pub(crate) lineage: PeerLineage,
    pub(crate) max_depth: usize,
    pub(crate) conversations: Arc<dyn PeerConversations>,
    pub(crate) audit: Arc<dyn AuditLog>,
    pub(crate) interaction_max_chars: usize,
}

#[async_trait]
impl Executor for PeerExecutor {
    fn input_text(&self, arguments: &Value) -> String {
        argument_text(arguments, "question")
    }

    async fn execute(&self, _context: &InvocationContext, arguments: Value) -> ToolResult<Value> {
        let question = string_argument(&arguments, "question")?;
        let lineage = self.lineage.extend(self.peer, self.max_depth)?;
        debug!(from = %self.asker, to = %self.peer, depth = lineage.depth(), "asking peer");

        let reply = self
            .conversations
            .ask(PeerRequest {
                from: self.asker,
                to: self.peer,
                question: question.clone(),
                lineage,
            })
            .await?;

        let mut interaction = AgentInteraction::new(self.asker, self.peer, question)
            .with_response(take_chars(&reply.text, self.interaction_max_chars));
        if let Some(thread_id) = &reply.thread_id {
            interaction = interaction.with_thread_id(thread_id);
        }
        if let Err(err) = self.audit.record_interaction(&interaction).await {
            error!(from = %self.asker, to = %self.peer, error = %err, "failed to write interaction record");
        }

        Ok(Value::String(reply.text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lineage_refuses_cycles_and_depth() {
        let a = AgentId::random();
        let b = AgentId::random();
        let c = AgentId::random();
        let d = AgentId::random();

        let root = PeerLineage::root(a);
        let ab = root.extend(b, 2).unwrap();
        assert_eq!(ab.depth(), 1);
        assert_eq!(ab.current(), Some(b));

        assert!(matches!(ab.extend(a, 2), Err(ToolError::PeerLimit { .. })));

        let abc = ab.extend(c, 2).unwrap();
        assert_eq!(abc.agents(), &[a, b, c]);
        let err = abc.extend(d, 2).unwrap_err();
        assert!(err.to_string().contains("maximum ask depth of 2"));

        assert!(root.extend(a, 3).is_err());
    }
}
