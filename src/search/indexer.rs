//! One-shot startup indexing of every tool the host knows about.

use crate::api::ToolSearchConfig;
use crate::traits::{ToolCallback, ToolSearcher, ToolSource};
use std::sync::{Arc, Mutex};

/// What a call to [`AutoIndexer::run`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexOutcome {
    /// A new snapshot with this many tools was committed.
    Indexed(usize),
    /// An earlier run already succeeded; nothing was done.
    AlreadyIndexed,
    /// `auto_index` is off.
    Disabled,
    /// The host supplied no indexable tools.
    NoTools,
    /// Indexing failed; the error was logged and the run may be retried.
    Failed(String),
}

/// Collects tools from a [`ToolSource`], drops the search tool itself, and
/// indexes the rest exactly once.
pub struct AutoIndexer {
    searcher: Arc<dyn ToolSearcher>,
    source: Arc<dyn ToolSource>,
    excluded_name: String,
    enabled: bool,
    indexed: Mutex<bool>,
}

impl AutoIndexer {
    pub fn new(
        searcher: Arc<dyn ToolSearcher>,
        source: Arc<dyn ToolSource>,
        config: &ToolSearchConfig,
    ) -> Self {
        Self {
            searcher,
            source,
            excluded_name: config.tool_name.clone(),
            enabled: config.auto_index,
            indexed: Mutex::new(false),
        }
    }

    pub fn is_done(&self) -> bool {
        *self
            .indexed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Index on the first call; later calls are no-ops once a run succeeded.
    pub fn run(&self) -> IndexOutcome {
        if !self.enabled {
            tracing::debug!("Automatic tool indexing disabled");
            return IndexOutcome::Disabled;
        }
        let mut indexed = self
            .indexed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *indexed {
            return IndexOutcome::AlreadyIndexed;
        }
        let outcome = self.index_now();
        if matches!(outcome, IndexOutcome::Indexed(_)) {
            *indexed = true;
        }
        outcome
    }

    /// Re-read the source and rebuild unconditionally.
    pub fn reindex(&self) -> IndexOutcome {
        let mut indexed = self
            .indexed
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let outcome = self.index_now();
        if matches!(outcome, IndexOutcome::Indexed(_)) {
            *indexed = true;
        }
        outcome
    }

    fn index_now(&self) -> IndexOutcome {
        let tools: Vec<Arc<dyn ToolCallback>> = self
            .source
            .tools()
            .into_iter()
            .filter(|tool| tool.definition().name != self.excluded_name)
            .collect();

        if tools.is_empty() {
            tracing::warn!("No tools found to index");
            return IndexOutcome::NoTools;
        }

        tracing::info!(candidates = tools.len(), "Indexing tools");
        match self.searcher.index_tools(tools) {
            Ok(0) => IndexOutcome::NoTools,
            Ok(count) => {
                tracing::info!(tools = count, "Tool indexing completed");
                IndexOutcome::Indexed(count)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to index tools");
                IndexOutcome::Failed(e.to_string())
            }
        }
    }
}
