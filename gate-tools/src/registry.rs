//! Assembled tool set handed to the language-model runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use gate_primitives::AgentId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::cancel::CancelToken;
use crate::error::{ToolError, ToolResult};

/// Metadata describing one exposed tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolMetadata {
    name: String,
    description: String,
    input_schema: Value,
}

impl ToolMetadata {
    /// Creates metadata. `name` must already be sanitized.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }

    /// Returns the tool identifier.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the JSON schema of the arguments.
    #[must_use]
    pub fn input_schema(&self) -> &Value {
        &self.input_schema
    }
}

/// Per-call context supplied by the runtime.
#[derive(Clone, Debug, Default)]
pub struct InvocationContext {
    caller: Option<AgentId>,
    cancel: Option<CancelToken>,
}

impl InvocationContext {
    /// Context with no caller and no cancellation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the calling agent.
    #[must_use]
    pub fn with_caller(mut self, caller: AgentId) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Ties the call to a turn's cancellation.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Calling agent, if known.
    #[must_use]
    pub const fn caller(&self) -> Option<AgentId> {
        self.caller
    }

    /// Cancellation token, if any.
    #[must_use]
    pub fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }
}

/// A callable exposed to the model.
///
/// Failures are reported inside the returned JSON as `{"error": ...}`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Invokes the tool with the model-supplied arguments.
    async fn invoke(&self, context: &InvocationContext, arguments: Value) -> Value;
}

/// Metadata plus the callable behind it.
#[derive(Clone)]
pub struct ToolHandle {
    metadata: ToolMetadata,
    tool: Arc<dyn Tool>,
}

impl fmt::Debug for ToolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolHandle")
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl ToolHandle {
    /// Pairs metadata with an implementation.
    #[must_use]
    pub fn new(metadata: ToolMetadata, tool: Arc<dyn Tool>) -> Self {
        Self { metadata, tool }
    }

    /// Returns the associated metadata.
    #[must_use]
    pub fn metadata(&self) -> &ToolMetadata {
        &self.metadata
    }

    /// Invokes with an empty context.
    pub async fn invoke(&self, arguments: Value) -> Value {
        self.tool.invoke(&InvocationContext::new(), arguments).await
    }

    /// Invokes with `context`.
    pub async fn invoke_with(&self, context: &InvocationContext, arguments: Value) -> Value {
        self.tool.invoke(context, arguments).await
    }
}

/// Flat name → tool mapping. Inserting an existing name replaces the
/// earlier entry.
#[derive(Clone, Default)]
pub struct ToolSet {
    tools: BTreeMap<String, ToolHandle>,
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolSet")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ToolSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `handle` under its metadata name, returning the handle it
    /// replaced, if any.
    pub fn insert(&mut self, handle: ToolHandle) -> Option<ToolHandle> {
        let name = handle.metadata().name().to_owned();
        let replaced = self.tools.insert(name.clone(), handle);
        if replaced.is_some() {
            warn!(tool = %name, "tool name collision; later source wins");
        }
        replaced
    }

    /// Moves every tool from `other` into this set, later entries winning.
    pub fn merge(&mut self, other: ToolSet) {
        for (_, handle) in other.tools {
            self.insert(handle);
        }
    }

    /// Returns a handle by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ToolHandle> {
        self.tools.get(name)
    }

    /// Whether a tool named `name` exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Tool names in sorted order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    /// Metadata of every tool.
    #[must_use]
    pub fn list(&self) -> Vec<ToolMetadata> {
        self.tools
            .values()
            .map(|handle| handle.metadata.clone())
            .collect()
    }

    /// Number of tools.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Invokes a tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] when the tool is not present.
    /// Execution failures are reported inside the returned payload.
    pub async fn invoke(
        &self,
        name: &str,
        context: &InvocationContext,
        arguments: Value,
    ) -> ToolResult<Value> {
        let handle = self.get(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_owned(),
        })?;
        Ok(handle.invoke_with(context, arguments).await)
    }
}

impl IntoIterator for ToolSet {
    type Item = (String, ToolHandle);
    type IntoIter = std::collections::btree_map::IntoIter<String, ToolHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.tools.into_iter()
    }
}
