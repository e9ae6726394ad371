//! Integrations with external governance systems.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::error;

use crate::contracts::CheckRequest;
use crate::decision::SecurityCheck;
use crate::engine::{PolicyResult, SecurityGate};

/// Trait implemented by remote governance backends.
#[async_trait]
pub trait GovernanceClient: Send + Sync {
    /// Evaluates the supplied request and returns a decision from the backend.
    async fn evaluate(&self, request: &CheckRequest) -> PolicyResult<SecurityCheck>;
}

/// Gate that delegates to a remote governance client and closes on failure.
#[derive(Clone)]
pub struct RemoteGate<C>
where
    C: GovernanceClient + 'static,
{
    client: Arc<C>,
}

impl<C> RemoteGate<C>
where
    C: GovernanceClient + 'static,
{
    /// Creates a new remote gate using the provided client.
    #[must_use]
    pub fn new(client: Arc<C>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<C> SecurityGate for RemoteGate<C>
where
    C: GovernanceClient + 'static,
{
    async fn check(&self, request: &CheckRequest) -> SecurityCheck {
        match self.client.evaluate(request).await {
            Ok(check) => check,
            Err(err) => {
                error!(tool = request.name(), error = %err, "governance backend failed");
                SecurityCheck::fault(err.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::codes;
    use crate::engine::PolicyError;

    struct StaticClient(bool);

    #[async_trait]
    impl GovernanceClient for StaticClient {
        async fn evaluate(&self, _request: &CheckRequest) -> PolicyResult<SecurityCheck> {
            if self.0 {
                Ok(SecurityCheck::passed())
            } else {
                Err(PolicyError::Backend {
                    reason: "unreachable".into(),
                })
            }
        }
    }

    #[tokio::test]
    async fn remote_gate_delegates_to_client() {
        let gate = RemoteGate::new(Arc::new(StaticClient(true)));
        let check = gate.check(&CheckRequest::new("code", "echo")).await;
        assert!(check.is_allowed());
    }

    #[tokio::test]
    async fn backend_errors_fail_closed() {
        let gate = RemoteGate::new(Arc::new(StaticClient(false)));
        let check = gate.check(&CheckRequest::new("code", "echo")).await;
        assert!(!check.is_allowed());
        assert_eq!(check.code(), codes::GATE_ERROR);
    }
}
