//! Built-in template routines.

use std::fmt;
use std::str::FromStr;

use gate_bridge::{Method, OutboundRequest};
use gate_primitives::CappedText;
use serde_json::{Map, Value};

use crate::calculator;
use crate::error::{ToolError, ToolResult};
use crate::outbound::{self, SkillHttp};

/// Routine selected by a template skill's identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateRoutine {
    /// HTTP call to `config.url`.
    ApiCaller,
    /// Arithmetic evaluation.
    Calculator,
    /// Feed download from `config.url`.
    RssFetcher,
    /// Page download from `config.url`.
    WebScraper,
    /// Keyword match over `config.knowledge`.
    KnowledgeLookup,
}

impl TemplateRoutine {
    /// Identifier as stored on the skill.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiCaller => "api-caller",
            Self::Calculator => "calculator",
            Self::RssFetcher => "rss-fetcher",
            Self::WebScraper => "web-scraper",
            Self::KnowledgeLookup => "knowledge-lookup",
        }
    }
}

impl fmt::Display for TemplateRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemplateRoutine {
    type Err = ToolError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "api-caller" => Ok(Self::ApiCaller),
            "calculator" => Ok(Self::Calculator),
            "rss-fetcher" => Ok(Self::RssFetcher),
            "web-scraper" => Ok(Self::WebScraper),
            "knowledge-lookup" => Ok(Self::KnowledgeLookup),
            other => Err(ToolError::UnknownTemplate {
                id: other.to_owned(),
            }),
        }
    }
}

/// Executes template skills.
///
/// The identifier is resolved per call so a bad identifier is audited like
/// any other failure.
pub(crate) struct TemplateExecutor {
    pub(crate) template_id: Option<String>,
    pub(crate) config: Map<String, Value>,
    pub(crate) http: SkillHttp,
    pub(crate) max_chars: usize,
}

impl TemplateExecutor {
    pub(crate) async fn run(&self, input: &str) -> ToolResult<String> {
        let id = self
            .template_id
            .as_deref()
            .ok_or_else(|| ToolError::config("template skill has no template id"))?;
        match id.parse::<TemplateRoutine>()? {
            TemplateRoutine::ApiCaller => self.api_caller(input).await,
            TemplateRoutine::Calculator => calculator::evaluate(input),
            TemplateRoutine::RssFetcher => self.download("RSS", "RSS fetch failed").await,
            TemplateRoutine::WebScraper => self.download("Web scraper", "Web scrape failed").await,
            TemplateRoutine::KnowledgeLookup => Ok(self.knowledge_lookup(input)),
        }
    }

    async fn api_caller(&self, input: &str) -> ToolResult<String> {
        let url = outbound::required_url(&self.config, "API")?;
        let method = outbound::method(&self.config, Method::GET)?;
        let headers = self.http.headers(&self.config).await?;

        let mut request = OutboundRequest::new(method.clone(), url)
            .headers(headers)
            .timeout(self.http.deadline);
        if method == Method::POST {
            request = request.body(input.to_owned());
        }
        self.fetch(request, "API call failed").await
    }

    async fn download(&self, what: &str, failure: &'static str) -> ToolResult<String> {
        let url = outbound::required_url(&self.config, what)?;
        let request = OutboundRequest::get(url).timeout(self.http.deadline);
        self.fetch(request, failure).await
    }

    async fn fetch(&self, request: OutboundRequest, failure: &'static str) -> ToolResult<String> {
        let response = self
            .http
            .transport
            .fetch_text(request, self.max_chars)
            .await?;
        if !response.status().is_success() {
            return Err(ToolError::UpstreamStatus {
                context: failure,
                status: response.status().as_u16(),
            });
        }
        Ok(response.into_text())
    }

    fn knowledge_lookup(&self, input: &str) -> String {
        knowledge_lookup(
            self.config
                .get("knowledge")
                .and_then(Value::as_str)
                .unwrap_or_default(),
            input,
            self.max_chars,
        )
    }
}

/// Returns the lines of `knowledge` containing `query` (case-insensitive)
/// when some but not all lines match, otherwise the whole text.
pub(crate) fn knowledge_lookup(knowledge: &str, query: &str, max_chars: usize) -> String {
    if knowledge.is_empty() {
        return "No knowledge content configured for this skill.".to_owned();
    }

    let query = query.to_lowercase();
    let lines: Vec<&str> = knowledge.split('\n').collect();
    let matches: Vec<&str> = lines
        .iter()
        .copied()
        .filter(|line| line.to_lowercase().contains(&query))
        .collect();

    let text = if !matches.is_empty() && matches.len() < lines.len() {
        matches.join("\n")
    } else {
        knowledge.to_owned()
    };
    CappedText::new(text, max_chars).into_string()
}
