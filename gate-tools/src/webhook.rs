//! Webhook skills: POST the input to a configured endpoint.

use gate_bridge::{Method, OutboundRequest};
use serde_json::{Map, Value, json};

use crate::error::{ToolError, ToolResult};
use crate::outbound::{self, SkillHttp};

/// Executes webhook skills.
pub(crate) struct WebhookExecutor {
    pub(crate) config: Map<String, Value>,
    pub(crate) http: SkillHttp,
    pub(crate) default_max_chars: usize,
}

impl WebhookExecutor {
    pub(crate) async fn run(&self, input: &str) -> ToolResult<String> {
        let url = outbound::required_url(&self.config, "webhook")?;
        let method = outbound::method(&self.config, Method::POST)?;
        let headers = self.http.headers(&self.config).await?;
        let max_chars = self.max_chars();

        let request = OutboundRequest::new(method, url)
            .header("Content-Type", "application/json")
            .headers(headers)
            .body(json!({ "input": input }).to_string())
            .timeout(self.http.deadline);

        let response = self.http.transport.fetch_text(request, max_chars).await?;
        if !response.status().is_success() {
            return Err(ToolError::UpstreamStatus {
                context: "webhook failed",
                status: response.status().as_u16(),
            });
        }
        Ok(response.into_text())
    }

    fn max_chars(&self) -> usize {
        self.config
            .get("maxResponseSize")
            .and_then(Value::as_u64)
            .filter(|size| *size > 0)
            .and_then(|size| usize::try_from(size).ok())
            .unwrap_or(self.default_max_chars)
    }
}
