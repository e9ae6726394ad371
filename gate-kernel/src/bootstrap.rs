//! Wires a [`ToolAssembler`] from a [`GatewayConfig`].

use std::sync::Arc;

use gate_audit::{AuditLog, FileAuditLog, TracingAuditLog};
use gate_bridge::{HttpTransport, RemoteClientConfig, RemoteToolClient};
use gate_config::GatewayConfig;
use gate_policy::{PolicyGate, SecurityGate};
use gate_registry::CapabilityRegistry;
use gate_tools::{ExecutionLimits, PeerConversations, ToolFactory};
use tracing::info;

use crate::assembler::ToolAssembler;
use crate::error::KernelResult;

/// Assembles the gateway's collaborators, with optional overrides.
pub struct GatewayBuilder {
    config: GatewayConfig,
    registry: Arc<dyn CapabilityRegistry>,
    gate: Option<Arc<dyn SecurityGate>>,
    audit: Option<Arc<dyn AuditLog>>,
    peers: Option<Arc<dyn PeerConversations>>,
}

impl GatewayBuilder {
    /// Starts from `config`, reading entities through `registry`.
    #[must_use]
    pub fn new(config: GatewayConfig, registry: Arc<dyn CapabilityRegistry>) -> Self {
        Self {
            config,
            registry,
            gate: None,
            audit: None,
            peers: None,
        }
    }

    /// Uses `gate` instead of a [`PolicyGate`] built from `policy.*`.
    #[must_use]
    pub fn gate(mut self, gate: Arc<dyn SecurityGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Uses `audit` instead of the sink selected by `audit.journal_path`.
    #[must_use]
    pub fn audit(mut self, audit: Arc<dyn AuditLog>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Enables peer tools.
    #[must_use]
    pub fn peer_conversations(mut self, conversations: Arc<dyn PeerConversations>) -> Self {
        self.peers = Some(conversations);
        self
    }

    /// Builds the assembler.
    ///
    /// # Errors
    ///
    /// Fails when the TLS client cannot be created or the audit journal
    /// cannot be opened.
    pub async fn build(self) -> KernelResult<ToolAssembler> {
        let config = &self.config;

        let gate = match self.gate {
            Some(gate) => gate,
            None => Arc::new(policy_gate(config)),
        };
        let audit: Arc<dyn AuditLog> = match (self.audit, &config.audit.journal_path) {
            (Some(audit), _) => audit,
            (None, Some(path)) => Arc::new(FileAuditLog::open(path.clone()).await?),
            (None, None) => Arc::new(TracingAuditLog),
        };

        let mut transport = HttpTransport::new()?;
        if let Some(agent) = &config.http.user_agent {
            transport = transport.with_user_agent(agent.clone());
        }
        let transport = Arc::new(transport);
        let remote = Arc::new(RemoteToolClient::new(
            Arc::clone(&transport),
            RemoteClientConfig {
                list_timeout: config.http.list_timeout(),
                call_timeout: config.http.default_timeout(),
                max_response_bytes: config.limits.remote_max_bytes,
            },
        ));

        let factory = ToolFactory::new(
            gate,
            audit,
            Arc::clone(&self.registry),
            remote,
            transport,
            execution_limits(config),
        );
        let mut assembler = ToolAssembler::new(self.registry, factory);
        if let Some(peers) = self.peers {
            assembler = assembler.with_peer_conversations(peers);
        }

        info!(
            journal = ?config.audit.journal_path,
            allowed_domains = config.policy.allowed_domains.len(),
            block_private_networks = config.policy.block_private_networks,
            "gateway ready"
        );
        Ok(assembler)
    }
}

/// Gate built from `policy.*`.
#[must_use]
pub fn policy_gate(config: &GatewayConfig) -> PolicyGate {
    PolicyGate::builder()
        .max_input_chars(config.policy.max_input_chars)
        .block_private_networks(config.policy.block_private_networks)
        .allowed_domains(&config.policy.allowed_domains)
        .rate_window(config.policy.rate_window())
        .build()
}

/// Execution limits taken from `limits.*`, `http.*`, and `peers.*`.
#[must_use]
pub fn execution_limits(config: &GatewayConfig) -> ExecutionLimits {
    ExecutionLimits {
        template_max_chars: config.limits.template_max_chars,
        webhook_max_chars: config.limits.webhook_max_chars,
        audit_max_chars: config.limits.audit_max_chars,
        interaction_max_chars: config.limits.interaction_max_chars,
        default_timeout: config.http.default_timeout(),
        peer_max_depth: config.peers.max_depth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gate_policy::{CheckRequest, codes};
    use gate_registry::InMemoryRegistry;

    #[test]
    fn policy_section_drives_gate_rules() {
        let mut config = GatewayConfig::default();
        config.policy.allowed_domains = vec!["example.com".into()];
        let gate = policy_gate(&config);
        assert_eq!(
            gate.rule_names(),
            vec!["approval", "input_size", "private_network", "domain_allowlist", "rate_limit"]
        );

        let request = CheckRequest::new("webhook", "hook").with_target_url("http://127.0.0.1/x");
        assert_eq!(gate.evaluate(&request).code(), codes::PRIVATE_NETWORK_BLOCKED);
    }

    #[test]
    fn limits_follow_config() {
        let mut config = GatewayConfig::default();
        config.limits.webhook_max_chars = 77;
        config.peers.max_depth = 9;
        let limits = execution_limits(&config);
        assert_eq!(limits.webhook_max_chars, 77);
        assert_eq!(limits.peer_max_depth, 9);
        assert_eq!(limits.default_timeout, config.http.default_timeout());
    }

    #[tokio::test]
    async fn builds_with_journal() {
        let mut config = GatewayConfig::default();
        let path = std::env::temp_dir().join(format!("skillgate-boot-{}.ndjson", std::process::id()));
        config.audit.journal_path = Some(path.clone());

        let assembler = GatewayBuilder::new(config, Arc::new(InMemoryRegistry::new()))
            .build()
            .await
            .unwrap();
        assert!(assembler.assemble(None).await.unwrap().is_empty());
        assert!(path.exists());
        std::fs::remove_file(path).ok();
    }
}
