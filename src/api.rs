//! Public configuration types for the tool-search subsystem, the video task
//! pipeline, and the shared retry policy.
//!
//! All types deserialize from JSON with per-field defaults, so a config file
//! only needs to name the keys it overrides.

use crate::error::{Result, ScopeError};
use crate::video::options::VideoOptions;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

/// Well-known name of the search tool itself. The auto-indexer never indexes
/// a tool with this name.
pub const DEFAULT_TOOL_NAME: &str = "tool_search";

/// Default number of results returned when a request does not ask for a
/// positive `max_results`.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Hard cap on results for a single search request.
pub const MAX_RESULTS_CAP: usize = 100;

pub const DEFAULT_NAME_BOOST: f32 = 3.0;
pub const DEFAULT_DESCRIPTION_BOOST: f32 = 2.0;
pub const DEFAULT_PARAMETERS_BOOST: f32 = 1.0;

/// Description advertised to the model for the search tool.
pub const DEFAULT_TOOL_DESCRIPTION: &str = "Search for available tools by keyword or description.
Use this when you need a tool but it's not currently available.

Example queries:
- \"weather\" - find weather-related tools
- \"database query\" - find tools for querying databases
- \"file operations\" - find file manipulation tools
";

/// Settings for the tool-search subsystem.
///
/// # Example JSON
///
/// ```json
/// {
///   "max_results": 8,
///   "name_boost": 4.0,
///   "extra_fields": { "tags": 1.5 }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSearchConfig {
    /// Master switch for the search subsystem.
    pub enabled: bool,
    /// Run the startup indexer.
    pub auto_index: bool,
    /// Service-level default result count (1..=100).
    pub max_results: usize,
    pub name_boost: f32,
    pub description_boost: f32,
    pub parameters_boost: f32,
    /// Additional indexed fields and their boosts. Values are read from tools
    /// through [`ToolCallback::index_field`](crate::traits::ToolCallback::index_field).
    pub extra_fields: BTreeMap<String, f32>,
    /// Name under which the search tool is exposed to the model.
    pub tool_name: String,
    /// Description under which the search tool is exposed to the model.
    pub tool_description: String,
}

impl Default for ToolSearchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auto_index: true,
            max_results: DEFAULT_MAX_RESULTS,
            name_boost: DEFAULT_NAME_BOOST,
            description_boost: DEFAULT_DESCRIPTION_BOOST,
            parameters_boost: DEFAULT_PARAMETERS_BOOST,
            extra_fields: BTreeMap::new(),
            tool_name: DEFAULT_TOOL_NAME.to_string(),
            tool_description: DEFAULT_TOOL_DESCRIPTION.to_string(),
        }
    }
}

impl ToolSearchConfig {
    /// Validate invariants: boosts finite and positive, `max_results` within
    /// `1..=100`, tool name non-empty.
    pub fn validate(&self) -> Result<()> {
        if self.max_results == 0 || self.max_results > MAX_RESULTS_CAP {
            return Err(ScopeError::Config(format!(
                "max_results must be between 1 and {}, got {}",
                MAX_RESULTS_CAP, self.max_results
            )));
        }
        validate_boost("name", self.name_boost)?;
        validate_boost("description", self.description_boost)?;
        validate_boost("parameters", self.parameters_boost)?;
        for (field, boost) in &self.extra_fields {
            if field.trim().is_empty() {
                return Err(ScopeError::Config(
                    "Extra index field name cannot be empty".to_string(),
                ));
            }
            validate_boost(field, *boost)?;
        }
        if self.tool_name.trim().is_empty() {
            return Err(ScopeError::Config("Tool name cannot be empty".to_string()));
        }
        Ok(())
    }
}

/// Reject boosts that are not finite or not strictly positive.
pub(crate) fn validate_boost(field: &str, boost: f32) -> Result<()> {
    if !boost.is_finite() || boost <= 0.0 {
        return Err(ScopeError::Config(format!(
            "Boost for field '{}' must be finite and > 0, got {}",
            field, boost
        )));
    }
    Ok(())
}

/// Bounded exponential-backoff policy used by the task poller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the initial call).
    pub max_attempts: u32,
    /// Delay after the first failed attempt, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Factor applied to the delay after each further attempt.
    pub multiplier: f64,
    /// Upper bound for a single delay, in milliseconds.
    pub max_backoff_ms: u64,
}

impl RetryConfig {
    /// Compute the backoff duration for the given 1-based `attempt` number:
    /// `min(initial_backoff_ms * multiplier^(attempt - 1), max_backoff_ms)`.
    pub fn get_backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let raw = self.initial_backoff_ms as f64 * self.multiplier.powi(exponent);
        let capped = if raw.is_finite() {
            raw.min(self.max_backoff_ms as f64)
        } else {
            self.max_backoff_ms as f64
        };
        Duration::from_millis(capped as u64)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(ScopeError::Config(
                "Retry max_attempts must be greater than 0".to_string(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 1.0 {
            return Err(ScopeError::Config(format!(
                "Retry multiplier must be finite and >= 1.0, got {}",
                self.multiplier
            )));
        }
        if self.max_backoff_ms < self.initial_backoff_ms {
            return Err(ScopeError::Config(
                "Retry max_backoff_ms must be >= initial_backoff_ms".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            initial_backoff_ms: 2_000,
            multiplier: 5.0,
            max_backoff_ms: 180_000,
        }
    }
}

pub const DEFAULT_BASE_URL: &str = "https://dashscope.aliyuncs.com";
pub const DEFAULT_API_KEY_ENV: &str = "DASHSCOPE_API_KEY";
pub const DEFAULT_QUERY_TASK_PATH: &str = "/api/v1/tasks/{task_id}";

/// Settings for the video task pipeline and its vendor transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    pub base_url: String,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    /// Submission path for models missing from the endpoint catalog.
    pub video_path: String,
    /// Query path; `{task_id}` is substituted per poll.
    pub query_task_path: String,
    /// Per-request HTTP timeout in seconds. `None` means the client default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    /// Default options merged under every caller's options.
    pub options: VideoOptions,
    pub retry: RetryConfig,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            video_path: crate::video::catalog::VIDEO_GENERATION_SYNTHESIS.to_string(),
            query_task_path: DEFAULT_QUERY_TASK_PATH.to_string(),
            request_timeout_secs: None,
            options: VideoOptions::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl VideoConfig {
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(ScopeError::Config("Base URL cannot be empty".to_string()));
        }
        if self.video_path.trim().is_empty() {
            return Err(ScopeError::Config("Video path cannot be empty".to_string()));
        }
        if !self.query_task_path.contains("{task_id}") {
            return Err(ScopeError::Config(format!(
                "Query task path '{}' must contain a {{task_id}} placeholder",
                self.query_task_path
            )));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(ScopeError::Config(
                "Request timeout must be greater than 0".to_string(),
            ));
        }
        self.retry.validate()
    }
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScopeConfig {
    pub tool_search: ToolSearchConfig,
    pub video: VideoConfig,
}

impl ScopeConfig {
    pub fn validate(&self) -> Result<()> {
        self.tool_search.validate()?;
        self.video.validate()
    }

    /// Parse and validate a configuration document from a JSON string.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(s)
            .map_err(|e| ScopeError::Config(format!("Invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a configuration document from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ScopeError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json_str(&contents)
    }
}
