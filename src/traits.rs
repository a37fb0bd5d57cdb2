//! Core traits at the seams between this crate and its host: tools supplied by
//! the application, the searcher that indexes them, and the transport used to
//! reach the vendor API.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// Static description of a tool: what the model sees when the tool is
/// declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Unique, non-empty tool name.
    pub name: String,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// JSON schema of the tool input, as a string. May be empty.
    #[serde(default)]
    pub input_schema: String,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: input_schema.into(),
        }
    }
}

/// A named callable function registered by the host application.
///
/// The search subsystem only ever reads [`definition`](Self::definition) and
/// [`index_field`](Self::index_field); it never invokes host tools.
#[async_trait]
pub trait ToolCallback: Send + Sync {
    fn definition(&self) -> &ToolDefinition;

    /// Text indexed for `field`. The defaults cover `name`, `description` and
    /// `parameters`; override to supply values for extra configured fields.
    fn index_field(&self, field: &str) -> Option<Cow<'_, str>> {
        let definition = self.definition();
        match field {
            "name" => Some(Cow::Borrowed(definition.name.as_str())),
            "description" => Some(Cow::Borrowed(definition.description.as_str())),
            "parameters" => Some(Cow::Borrowed(definition.input_schema.as_str())),
            _ => None,
        }
    }

    /// Invoke the tool with JSON-encoded arguments and return its JSON-encoded
    /// result.
    async fn call(&self, arguments: &str) -> Result<String>;
}

/// Enumerates every tool the host knows about. Consumed once at startup by
/// the [`AutoIndexer`](crate::search::indexer::AutoIndexer).
pub trait ToolSource: Send + Sync {
    fn tools(&self) -> Vec<Arc<dyn ToolCallback>>;
}

impl ToolSource for Vec<Arc<dyn ToolCallback>> {
    fn tools(&self) -> Vec<Arc<dyn ToolCallback>> {
        self.clone()
    }
}

/// One scored search result together with its pre-rendered schema.
#[derive(Clone)]
pub struct SearchHit {
    pub tool: Arc<dyn ToolCallback>,
    pub score: f64,
    /// Rendered `{"type":"function","function":{...}}` JSON.
    pub schema: Arc<str>,
}

impl std::fmt::Debug for SearchHit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchHit")
            .field("name", &self.tool.definition().name)
            .field("score", &self.score)
            .finish()
    }
}

/// Indexes tools and answers ranked queries over them.
pub trait ToolSearcher: Send + Sync {
    /// Replace the indexed tool set. Returns the number of tools committed.
    fn index_tools(&self, tools: Vec<Arc<dyn ToolCallback>>) -> Result<usize>;

    /// Return at most `max_results` hits, best first. Fails with
    /// [`IndexNotReady`](crate::error::ScopeError::IndexNotReady) before the
    /// first successful [`index_tools`](Self::index_tools).
    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;

    /// Rendered schema for `tool`, served from the cache when indexed.
    fn tool_schema(&self, tool: &dyn ToolCallback) -> Arc<str>;

    fn is_indexed(&self) -> bool;
}

/// A decoded HTTP response: status code and optional JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    /// `None` when the response carried no body.
    pub body: Option<Value>,
}

impl TransportResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            body: Some(body),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal request/response capability used to reach the vendor API.
///
/// Implementations return [`TransientTransport`](crate::error::ScopeError::TransientTransport)
/// for network failures and timeouts; HTTP status interpretation is left to
/// the caller.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post(
        &self,
        path: &str,
        body: &Value,
        headers: &[(&str, &str)],
    ) -> Result<TransportResponse>;

    async fn get(&self, path: &str, params: &[(&str, &str)]) -> Result<TransportResponse>;
}
