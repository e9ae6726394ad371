//! Client for remote tool servers speaking JSON-RPC over HTTP.

use std::sync::Arc;
use std::time::Duration;

use hyper::header::{ACCEPT, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::{BridgeError, BridgeResult};
use crate::rpc::{self, CALL_TOOL, LIST_TOOLS};
use crate::transport::{HttpTransport, OutboundRequest};

/// Tool advertised by a remote server.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteToolDescriptor {
    /// Name exactly as the server knows it; used verbatim on `tools/call`.
    pub name: String,
    /// Optional human-readable description.
    #[serde(default)]
    pub description: Option<String>,
    /// Optional JSON schema for the tool arguments.
    #[serde(default)]
    pub input_schema: Option<Value>,
}

impl RemoteToolDescriptor {
    /// Creates a descriptor with only a name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            input_schema: None,
        }
    }

    /// Description to expose, falling back to the tool name.
    #[must_use]
    pub fn description_or_name(&self) -> &str {
        self.description
            .as_deref()
            .filter(|text| !text.is_empty())
            .unwrap_or(&self.name)
    }

    /// Argument schema to expose, falling back to an empty object schema.
    #[must_use]
    pub fn schema_or_default(&self) -> Value {
        self.input_schema
            .clone()
            .unwrap_or_else(|| json!({"type": "object", "properties": {}}))
    }
}

/// Timeouts and caps applied by [`RemoteToolClient`].
#[derive(Clone, Copy, Debug)]
pub struct RemoteClientConfig {
    /// Deadline for `tools/list`.
    pub list_timeout: Duration,
    /// Deadline for `tools/call`.
    pub call_timeout: Duration,
    /// Largest reply body accepted.
    pub max_response_bytes: usize,
}

impl Default for RemoteClientConfig {
    fn default() -> Self {
        Self {
            list_timeout: Duration::from_secs(10),
            call_timeout: Duration::from_secs(30),
            max_response_bytes: 1024 * 1024,
        }
    }
}

/// Speaks `tools/list` and `tools/call` to remote servers.
#[derive(Clone, Debug)]
pub struct RemoteToolClient {
    transport: Arc<HttpTransport>,
    config: RemoteClientConfig,
}

impl RemoteToolClient {
    /// Creates a client over a shared transport.
    #[must_use]
    pub fn new(transport: Arc<HttpTransport>, config: RemoteClientConfig) -> Self {
        Self { transport, config }
    }

    /// Returns the active configuration.
    #[must_use]
    pub const fn config(&self) -> &RemoteClientConfig {
        &self.config
    }

    /// Lists the tools exposed at `endpoint`.
    ///
    /// A non-success status yields an empty list. Entries without a usable
    /// name are skipped.
    ///
    /// # Errors
    ///
    /// Returns transport, timeout, redirect, and decoding failures so the
    /// caller can skip this server.
    pub async fn list_tools(&self, endpoint: &str) -> BridgeResult<Vec<RemoteToolDescriptor>> {
        let request = self
            .request(endpoint, rpc::envelope(LIST_TOOLS, json!({})))
            .timeout(self.config.list_timeout);
        let response = self
            .transport
            .fetch_bytes(request, self.config.max_response_bytes)
            .await?;

        if !response.status().is_success() {
            warn!(
                endpoint,
                status = response.status().as_u16(),
                "tool listing rejected; treating server as empty"
            );
            return Ok(Vec::new());
        }

        let reply = rpc::decode_reply(response.content_type(), response.body())?;
        let entries = reply
            .pointer("/result/tools")
            .or_else(|| reply.get("tools"))
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let tools: Vec<RemoteToolDescriptor> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<RemoteToolDescriptor>(entry).ok())
            .filter(|tool| !tool.name.is_empty())
            .collect();
        debug!(endpoint, count = tools.len(), "listed remote tools");
        Ok(tools)
    }

    /// Invokes `tool` at `endpoint` with `arguments`.
    ///
    /// Returns the reply's `result` member, or the whole reply when it has none.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ToolCall`] for non-success statuses and the
    /// usual transport failures otherwise.
    pub async fn call_tool(&self, endpoint: &str, tool: &str, arguments: Value) -> BridgeResult<Value> {
        self.call_tool_with_timeout(endpoint, tool, arguments, self.config.call_timeout)
            .await
    }

    /// Same as [`RemoteToolClient::call_tool`] with an explicit deadline.
    ///
    /// # Errors
    ///
    /// See [`RemoteToolClient::call_tool`].
    pub async fn call_tool_with_timeout(
        &self,
        endpoint: &str,
        tool: &str,
        arguments: Value,
        deadline: Duration,
    ) -> BridgeResult<Value> {
        let params = json!({"name": tool, "arguments": arguments});
        let request = self
            .request(endpoint, rpc::envelope(CALL_TOOL, params))
            .timeout(deadline);
        let response = self
            .transport
            .fetch_bytes(request, self.config.max_response_bytes)
            .await?;

        if !response.status().is_success() {
            return Err(BridgeError::ToolCall {
                tool: tool.to_owned(),
                status: response.status().as_u16(),
            });
        }

        let mut reply = rpc::decode_reply(response.content_type(), response.body())?;
        match reply.get_mut("result").map(Value::take) {
            Some(result) if !result.is_null() => Ok(result),
            _ => Ok(reply),
        }
    }

    fn request(&self, endpoint: &str, envelope: Value) -> OutboundRequest {
        OutboundRequest::post(endpoint)
            .header(CONTENT_TYPE.as_str(), "application/json")
            .header(ACCEPT.as_str(), rpc::ACCEPT)
            .body(envelope.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestServer, json_response, text_response};

    fn client() -> RemoteToolClient {
        RemoteToolClient::new(
            Arc::new(HttpTransport::new().unwrap()),
            RemoteClientConfig::default(),
        )
    }

    #[tokio::test]
    async fn lists_tools_from_result_or_top_level() {
        let nested = TestServer::start(|_| async {
            json_response(
                200,
                &json!({"jsonrpc": "2.0", "id": 1, "result": {"tools": [
                    {"name": "search", "description": "Search", "inputSchema": {"type": "object"}},
                    {"description": "nameless"}
                ]}}),
            )
        });
        let flat = TestServer::start(|_| async {
            json_response(200, &json!({"tools": [{"name": "flat"}]}))
        });

        let tools = client().list_tools(&nested.url("/mcp")).await.unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "search");
        assert_eq!(tools[0].input_schema, Some(json!({"type": "object"})));

        let tools = client().list_tools(&flat.url("/")).await.unwrap();
        assert_eq!(tools[0].name, "flat");
        assert_eq!(tools[0].description_or_name(), "flat");
        assert_eq!(
            tools[0].schema_or_default(),
            json!({"type": "object", "properties": {}})
        );

        let recorded = &nested.requests()[0];
        assert_eq!(recorded.headers["accept"], rpc::ACCEPT);
        let sent: Value = serde_json::from_slice(&recorded.body).unwrap();
        assert_eq!(sent["method"], "tools/list");
    }

    #[tokio::test]
    async fn failed_listing_is_empty() {
        let server = TestServer::start(|_| async { text_response(500, "boom") });
        assert!(client().list_tools(&server.url("/")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn call_returns_result_member() {
        let server = TestServer::start(|_| async {
            json_response(200, &json!({"result": {"content": [{"type": "text", "text": "hi"}]}}))
        });
        let value = client()
            .call_tool(&server.url("/"), "greet", json!({"who": "x"}))
            .await
            .unwrap();
        assert_eq!(value["content"][0]["text"], "hi");

        let sent: Value = serde_json::from_slice(&server.requests()[0].body).unwrap();
        assert_eq!(sent["params"], json!({"name": "greet", "arguments": {"who": "x"}}));
    }

    #[tokio::test]
    async fn call_without_result_returns_whole_reply() {
        let server = TestServer::start(|_| async { json_response(200, &json!({"ok": true})) });
        let value = client()
            .call_tool(&server.url("/"), "t", json!({}))
            .await
            .unwrap();
        assert_eq!(value, json!({"ok": true}));
    }

    #[tokio::test]
    async fn call_failure_names_tool_and_status() {
        let server = TestServer::start(|_| async { text_response(503, "down") });
        let err = client()
            .call_tool(&server.url("/"), "weather", json!({}))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "weather call failed: 503");
    }
}
