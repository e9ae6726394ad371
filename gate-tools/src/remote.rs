//! Tools advertised by remote servers.

use std::sync::Arc;

use async_trait::async_trait;
use gate_bridge::RemoteToolClient;
use serde_json::Value;

use crate::error::ToolResult;
use crate::gated::Executor;
use crate::registry::InvocationContext;

/// Forwards calls to one tool on one remote server.
pub(crate) struct RemoteExecutor {
    pub(crate) client: Arc<RemoteToolClient>,
    pub(crate) endpoint: String,
    /// Name as advertised by the server, before sanitization.
    pub(crate) remote_name: String,
}

#[async_trait]
impl Executor for RemoteExecutor {
    fn input_text(&self, arguments: &Value) -> String {
        arguments.to_string()
    }

    async fn execute(&self, _context: &InvocationContext, arguments: Value) -> ToolResult<Value> {
        Ok(self
            .client
            .call_tool(&self.endpoint, &self.remote_name, arguments)
            .await?)
    }
}
