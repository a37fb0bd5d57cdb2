//! The tool-call surface: validates a search request, runs it against a
//! [`ToolSearcher`], and always answers with a structured [`SearchResponse`].

use crate::api::{DEFAULT_MAX_RESULTS, MAX_RESULTS_CAP, ToolSearchConfig};
use crate::error::{Result, ScopeError};
use crate::traits::{ToolCallback, ToolDefinition, ToolSearcher};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

pub const EMPTY_QUERY_MESSAGE: &str = "Query cannot be empty";
pub const NOT_INDEXED_MESSAGE: &str = "Tools not indexed. Please index tools first.";

/// JSON schema of the search tool's own input.
pub const SEARCH_INPUT_SCHEMA: &str = r#"{"type":"object","properties":{"query":{"type":"string","description":"Keywords or a short description of the capability you need"},"max_results":{"type":"integer","description":"Maximum number of tools to return (default 5, at most 100)"}},"required":["query"]}"#;

/// Input of the search tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    /// Values `<= 0` (or absent) select the configured default.
    #[serde(default)]
    pub max_results: Option<i64>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, max_results: i64) -> Self {
        Self {
            query: Some(query.into()),
            max_results: Some(max_results),
        }
    }
}

/// One matching tool as presented to the model. `schema` is the rendered
/// declaration as a JSON string, ready to embed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub schema: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub tools: Vec<ToolInfo>,
    pub total: usize,
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tools: Vec::new(),
            total: 0,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Request validation and error mapping around a [`ToolSearcher`].
pub struct SearchService {
    searcher: Arc<dyn ToolSearcher>,
    default_max_results: usize,
}

impl SearchService {
    pub fn new(searcher: Arc<dyn ToolSearcher>) -> Self {
        Self {
            searcher,
            default_max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn from_config(searcher: Arc<dyn ToolSearcher>, config: &ToolSearchConfig) -> Self {
        Self {
            searcher,
            default_max_results: config.max_results.clamp(1, MAX_RESULTS_CAP),
        }
    }

    pub fn searcher(&self) -> &Arc<dyn ToolSearcher> {
        &self.searcher
    }

    /// Effective result limit for a requested `max_results`.
    pub fn effective_limit(&self, requested: Option<i64>) -> usize {
        match requested {
            Some(n) if n > 0 => usize::try_from(n)
                .unwrap_or(MAX_RESULTS_CAP)
                .min(MAX_RESULTS_CAP),
            _ => self.default_max_results,
        }
    }

    /// Run `request`. Never fails: every error becomes the `error` field.
    pub fn search(&self, request: &SearchRequest) -> SearchResponse {
        let start = Instant::now();
        let (response, status) = self.execute(request);

        metrics::counter!("tool_search.requests", "status" => status).increment(1);
        metrics::histogram!("tool_search.duration_seconds").record(start.elapsed().as_secs_f64());
        response
    }

    fn execute(&self, request: &SearchRequest) -> (SearchResponse, &'static str) {
        let query = match request.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => {
                tracing::debug!("Rejecting empty tool search query");
                return (SearchResponse::error(EMPTY_QUERY_MESSAGE), "empty_query");
            }
        };
        let limit = self.effective_limit(request.max_results);

        match self.searcher.search(query, limit) {
            Ok(hits) => {
                let tools: Vec<ToolInfo> = hits
                    .into_iter()
                    .map(|hit| {
                        let definition = hit.tool.definition();
                        ToolInfo {
                            name: definition.name.clone(),
                            description: definition.description.clone(),
                            schema: hit.schema.to_string(),
                        }
                    })
                    .collect();
                tracing::debug!(query = %query, limit, total = tools.len(), "Tool search served");
                let total = tools.len();
                (
                    SearchResponse {
                        tools,
                        total,
                        error: None,
                    },
                    "success",
                )
            }
            Err(ScopeError::IndexNotReady) => {
                tracing::warn!(query = %query, "Tool search before indexing");
                (SearchResponse::error(NOT_INDEXED_MESSAGE), "not_indexed")
            }
            Err(e) => {
                tracing::error!(query = %query, error = %e, "Tool search failed");
                (
                    SearchResponse::error(format!("Search failed: {}", e)),
                    "failure",
                )
            }
        }
    }
}

/// The search service exposed to the model as an ordinary tool.
pub struct ToolSearchTool {
    definition: ToolDefinition,
    service: SearchService,
}

impl ToolSearchTool {
    pub fn new(service: SearchService, name: &str, description: &str) -> Self {
        Self {
            definition: ToolDefinition::new(name, description, SEARCH_INPUT_SCHEMA),
            service,
        }
    }

    pub fn from_config(searcher: Arc<dyn ToolSearcher>, config: &ToolSearchConfig) -> Self {
        Self::new(
            SearchService::from_config(searcher, config),
            &config.tool_name,
            &config.tool_description,
        )
    }

    pub fn service(&self) -> &SearchService {
        &self.service
    }

    /// Decode `arguments`, search, and return the response. Malformed
    /// arguments produce an error response rather than a failure.
    pub fn invoke(&self, arguments: &str) -> SearchResponse {
        match serde_json::from_str::<SearchRequest>(arguments) {
            Ok(request) => self.service.search(&request),
            Err(e) => {
                tracing::warn!(error = %e, "Malformed tool search arguments");
                metrics::counter!("tool_search.requests", "status" => "failure").increment(1);
                SearchResponse::error(ScopeError::InvalidRequest(e.to_string()).to_string())
            }
        }
    }
}

#[async_trait]
impl ToolCallback for ToolSearchTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, arguments: &str) -> Result<String> {
        serde_json::to_string(&self.invoke(arguments))
            .map_err(|e| ScopeError::Protocol(format!("Failed to encode search response: {}", e)))
    }
}
