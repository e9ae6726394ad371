//! Audit sink trait and in-process implementations.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::info;

use crate::AuditResult;
use crate::record::{AgentInteraction, AuditEntry, InvocationRecord};

/// Append-only destination for audit entries.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Appends one invocation record.
    async fn record_invocation(&self, record: &InvocationRecord) -> AuditResult<()>;

    /// Appends one agent interaction entry.
    async fn record_interaction(&self, interaction: &AgentInteraction) -> AuditResult<()>;
}

/// Keeps every entry in memory, in arrival order.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries.
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().await.clone()
    }

    /// Invocation records only.
    pub async fn invocations(&self) -> Vec<InvocationRecord> {
        self.entries
            .lock()
            .await
            .iter()
            .filter_map(|entry| match entry {
                AuditEntry::Invocation(record) => Some(record.clone()),
                AuditEntry::Interaction(_) => None,
            })
            .collect()
    }

    /// Interaction entries only.
    pub async fn interactions(&self) -> Vec<AgentInteraction> {
        self.entries
            .lock()
            .await
            .iter()
            .filter_map(|entry| match entry {
                AuditEntry::Interaction(interaction) => Some(interaction.clone()),
                AuditEntry::Invocation(_) => None,
            })
            .collect()
    }
}

#[async_trait]
impl AuditLog for MemoryAuditLog {
    async fn record_invocation(&self, record: &InvocationRecord) -> AuditResult<()> {
        self.entries
            .lock()
            .await
            .push(AuditEntry::Invocation(record.clone()));
        Ok(())
    }

    async fn record_interaction(&self, interaction: &AgentInteraction) -> AuditResult<()> {
        self.entries
            .lock()
            .await
            .push(AuditEntry::Interaction(interaction.clone()));
        Ok(())
    }
}

/// Emits entries as structured `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditLog;

#[async_trait]
impl AuditLog for TracingAuditLog {
    async fn record_invocation(&self, record: &InvocationRecord) -> AuditResult<()> {
        info!(
            target: "skillgate::audit",
            skill = record.skill_name(),
            kind = record.skill_type(),
            success = record.is_success(),
            security = record.security_check_result(),
            duration_ms = record.duration_ms(),
            error = record.error_message().unwrap_or_default(),
            "tool invocation"
        );
        Ok(())
    }

    async fn record_interaction(&self, interaction: &AgentInteraction) -> AuditResult<()> {
        info!(
            target: "skillgate::audit",
            from = %interaction.from_agent_id(),
            to = %interaction.to_agent_id(),
            thread = interaction.thread_id().unwrap_or_default(),
            answered = interaction.response().is_some(),
            "agent interaction"
        );
        Ok(())
    }
}

/// Fans every entry out to several sinks; the first failure is reported
/// after all sinks were attempted.
#[derive(Clone, Default)]
pub struct CompositeAuditLog {
    sinks: Vec<Arc<dyn AuditLog>>,
}

impl CompositeAuditLog {
    /// Creates a composite over `sinks`.
    #[must_use]
    pub fn new(sinks: impl IntoIterator<Item = Arc<dyn AuditLog>>) -> Self {
        Self {
            sinks: sinks.into_iter().collect(),
        }
    }
}

#[async_trait]
impl AuditLog for CompositeAuditLog {
    async fn record_invocation(&self, record: &InvocationRecord) -> AuditResult<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(err) = sink.record_invocation(record).await {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    async fn record_interaction(&self, interaction: &AgentInteraction) -> AuditResult<()> {
        let mut first_error = None;
        for sink in &self.sinks {
            if let Err(err) = sink.record_interaction(interaction).await {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
