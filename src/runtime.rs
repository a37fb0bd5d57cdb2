//! The tool-search runtime: owns the searcher, runs the startup indexer, and
//! exposes the search tool to the host.

use crate::api::ToolSearchConfig;
use crate::error::Result;
use crate::search::indexer::{AutoIndexer, IndexOutcome};
use crate::search::searcher::LexicalToolSearcher;
use crate::search::service::ToolSearchTool;
use crate::traits::{ToolCallback, ToolSearcher, ToolSource};
use std::sync::Arc;

/// Ready-to-use tool search for one host.
///
/// Obtain an instance via [`ToolSearchRuntime::builder()`]. Building
/// validates the configuration, creates the [`LexicalToolSearcher`], and
/// (unless `auto_index` is off) indexes the host's tools once.
pub struct ToolSearchRuntime {
    config: ToolSearchConfig,
    searcher: Arc<LexicalToolSearcher>,
    indexer: AutoIndexer,
    tool: Option<Arc<ToolSearchTool>>,
    startup: IndexOutcome,
}

impl ToolSearchRuntime {
    pub fn builder() -> ToolSearchRuntimeBuilder {
        ToolSearchRuntimeBuilder::default()
    }

    pub fn config(&self) -> &ToolSearchConfig {
        &self.config
    }

    pub fn searcher(&self) -> &Arc<LexicalToolSearcher> {
        &self.searcher
    }

    /// The search tool to declare to the model; `None` when search is
    /// disabled.
    pub fn search_tool(&self) -> Option<Arc<ToolSearchTool>> {
        self.tool.clone()
    }

    /// Outcome of the indexing run performed during build.
    pub fn startup_outcome(&self) -> &IndexOutcome {
        &self.startup
    }

    pub fn is_indexed(&self) -> bool {
        self.searcher.is_indexed()
    }

    /// Re-read the host's tools and rebuild the index. Concurrent searches
    /// keep using the previous snapshot until the new one is committed.
    pub fn reindex(&self) -> IndexOutcome {
        if !self.config.enabled {
            return IndexOutcome::Disabled;
        }
        self.indexer.reindex()
    }

    /// Drop the index. Searches report "not indexed" until [`reindex`](Self::reindex).
    pub fn dispose(&self) {
        self.searcher.dispose();
    }
}

/// Builder for [`ToolSearchRuntime`].
///
/// ```rust
/// use scopekit::runtime::ToolSearchRuntime;
/// use scopekit::traits::{ToolCallback, ToolDefinition};
/// use std::sync::Arc;
///
/// struct Weather(ToolDefinition);
///
/// #[async_trait::async_trait]
/// impl ToolCallback for Weather {
///     fn definition(&self) -> &ToolDefinition { &self.0 }
///     async fn call(&self, _args: &str) -> scopekit::error::Result<String> { Ok("{}".into()) }
/// }
///
/// let weather: Arc<dyn ToolCallback> =
///     Arc::new(Weather(ToolDefinition::new("get_weather", "Current weather", "")));
/// let runtime = ToolSearchRuntime::builder().tools(vec![weather]).build().unwrap();
/// assert!(runtime.is_indexed());
/// ```
#[derive(Default)]
pub struct ToolSearchRuntimeBuilder {
    config: ToolSearchConfig,
    source: Option<Arc<dyn ToolSource>>,
}

impl ToolSearchRuntimeBuilder {
    pub fn config(mut self, config: ToolSearchConfig) -> Self {
        self.config = config;
        self
    }

    /// Index a fixed list of host tools.
    pub fn tools(mut self, tools: Vec<Arc<dyn ToolCallback>>) -> Self {
        self.source = Some(Arc::new(tools));
        self
    }

    /// Read host tools from `source` at build time and on every reindex.
    pub fn tool_source(mut self, source: Arc<dyn ToolSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Index an additional field with `boost`. Tools supply its text via
    /// [`ToolCallback::index_field`].
    pub fn index_field(mut self, field: &str, boost: f32) -> Self {
        self.config.extra_fields.insert(field.to_string(), boost);
        self
    }

    /// Validate the config, build the searcher, and run the startup indexer.
    pub fn build(self) -> Result<Arc<ToolSearchRuntime>> {
        self.config.validate()?;
        let searcher = Arc::new(LexicalToolSearcher::from_config(&self.config)?);
        let source = self
            .source
            .unwrap_or_else(|| Arc::new(Vec::<Arc<dyn ToolCallback>>::new()));
        let indexer = AutoIndexer::new(searcher.clone(), source, &self.config);

        let (tool, startup) = if self.config.enabled {
            let tool = Arc::new(ToolSearchTool::from_config(searcher.clone(), &self.config));
            (Some(tool), indexer.run())
        } else {
            tracing::info!("Tool search disabled");
            (None, IndexOutcome::Disabled)
        };
        tracing::info!(outcome = ?startup, "Tool search runtime ready");

        Ok(Arc::new(ToolSearchRuntime {
            config: self.config,
            searcher,
            indexer,
            tool,
            startup,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScopeError;
    use crate::mock::StaticTool;
    use crate::search::service::SearchResponse;

    fn host_tools() -> Vec<Arc<dyn ToolCallback>> {
        vec![
            StaticTool::shared("get_weather", "Weather forecast for a city", ""),
            StaticTool::shared("run_sql", "Run a database query", ""),
        ]
    }

    #[tokio::test]
    async fn builds_indexes_and_serves() {
        let runtime = ToolSearchRuntime::builder().tools(host_tools()).build().unwrap();
        assert_eq!(runtime.startup_outcome(), &IndexOutcome::Indexed(2));

        let tool = runtime.search_tool().unwrap();
        let output = tool.call(r#"{"query":"database"}"#).await.unwrap();
        let response: SearchResponse = serde_json::from_str(&output).unwrap();
        assert_eq!(response.tools[0].name, "run_sql");
    }

    #[test]
    fn disabled_has_no_tool() {
        let config = ToolSearchConfig {
            enabled: false,
            ..ToolSearchConfig::default()
        };
        let runtime = ToolSearchRuntime::builder()
            .config(config)
            .tools(host_tools())
            .build()
            .unwrap();
        assert!(runtime.search_tool().is_none());
        assert!(!runtime.is_indexed());
        assert_eq!(runtime.reindex(), IndexOutcome::Disabled);
    }

    #[test]
    fn manual_indexing_when_auto_index_off() {
        let config = ToolSearchConfig {
            auto_index: false,
            ..ToolSearchConfig::default()
        };
        let runtime = ToolSearchRuntime::builder()
            .config(config)
            .tools(host_tools())
            .build()
            .unwrap();
        assert_eq!(runtime.startup_outcome(), &IndexOutcome::Disabled);
        assert!(!runtime.is_indexed());
        assert_eq!(runtime.reindex(), IndexOutcome::Indexed(2));
        assert!(runtime.is_indexed());
    }

    #[test]
    fn extra_index_field_is_searchable() {
        let tagged: Arc<dyn ToolCallback> =
            Arc::new(StaticTool::new("lookup", "", "").with_field("tags", "meteorology"));
        let runtime = ToolSearchRuntime::builder()
            .tools(vec![tagged])
            .index_field("tags", 1.5)
            .build()
            .unwrap();
        let hits = runtime.searcher().search("meteorology", 5).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn invalid_config_fails_build() {
        let config = ToolSearchConfig {
            description_boost: -1.0,
            ..ToolSearchConfig::default()
        };
        assert!(matches!(
            ToolSearchRuntime::builder().config(config).build(),
            Err(ScopeError::Config(_))
        ));
    }

    #[test]
    fn dispose_then_reindex() {
        let runtime = ToolSearchRuntime::builder().tools(host_tools()).build().unwrap();
        runtime.dispose();
        assert!(!runtime.is_indexed());
        assert_eq!(runtime.reindex(), IndexOutcome::Indexed(2));
    }
}
