//! [`ToolSearcher`] backed by a [`LexicalIndex`], published as one atomic
//! snapshot together with its [`ToolRegistry`].

use crate::api::ToolSearchConfig;
use crate::error::{Result, ScopeError};
use crate::search::index::{FieldBoosts, LexicalIndex};
use crate::search::registry::{ToolRegistry, render_schema};
use crate::traits::{SearchHit, ToolCallback, ToolSearcher};
use arc_swap::ArcSwapOption;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Registry and index built from the same tool list. Readers load the whole
/// generation at once, so hits always resolve against the registry they were
/// scored with.
pub struct IndexGeneration {
    pub id: u64,
    pub registry: ToolRegistry,
    pub index: LexicalIndex,
}

/// Single-writer, many-reader lexical searcher.
///
/// State machine: UNREADY until the first successful
/// [`index_tools`](ToolSearcher::index_tools), READY afterwards, and UNREADY
/// again only after [`dispose`](Self::dispose).
pub struct LexicalToolSearcher {
    boosts: FieldBoosts,
    current: ArcSwapOption<IndexGeneration>,
    writer: Mutex<()>,
    next_generation: AtomicU64,
}

impl LexicalToolSearcher {
    pub fn new() -> Self {
        Self::with_boosts(FieldBoosts::default())
    }

    pub fn builder() -> LexicalToolSearcherBuilder {
        LexicalToolSearcherBuilder::default()
    }

    pub fn from_config(config: &ToolSearchConfig) -> Result<Self> {
        config.validate()?;
        let boosts = FieldBoosts::from_config(config);
        boosts.validate()?;
        Ok(Self::with_boosts(boosts))
    }

    fn with_boosts(boosts: FieldBoosts) -> Self {
        Self {
            boosts,
            current: ArcSwapOption::empty(),
            writer: Mutex::new(()),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn boosts(&self) -> &FieldBoosts {
        &self.boosts
    }

    /// The committed generation, if any.
    pub fn snapshot(&self) -> Option<Arc<IndexGeneration>> {
        self.current.load_full()
    }

    /// Drop the current generation; subsequent searches fail with
    /// [`ScopeError::IndexNotReady`] until the next successful index.
    pub fn dispose(&self) {
        let _guard = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        self.current.store(None);
        tracing::info!("Tool index disposed");
    }
}

impl Default for LexicalToolSearcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolSearcher for LexicalToolSearcher {
    fn index_tools(&self, tools: Vec<Arc<dyn ToolCallback>>) -> Result<usize> {
        if tools.is_empty() {
            tracing::warn!("No tools to index");
            return Ok(0);
        }

        let _guard = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let start = std::time::Instant::now();
        let registry = ToolRegistry::put_all(tools);
        let index = LexicalIndex::build(registry.tools(), &self.boosts)?;
        let count = registry.len();
        let id = self.next_generation.fetch_add(1, Ordering::SeqCst);

        self.current.store(Some(Arc::new(IndexGeneration {
            id,
            registry,
            index,
        })));

        metrics::counter!("tool_index.rebuilds").increment(1);
        metrics::gauge!("tool_index.documents").set(count as f64);
        tracing::info!(
            generation = id,
            tools = count,
            fields = ?self.boosts.names(),
            elapsed_ms = start.elapsed().as_millis(),
            "Indexed tools"
        );
        Ok(count)
    }

    fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let generation = self.current.load_full().ok_or(ScopeError::IndexNotReady)?;

        let hits = generation
            .index
            .search(query, max_results)
            .into_iter()
            .filter_map(|(ordinal, score)| {
                let Some(indexed) = generation.registry.by_ordinal(ordinal) else {
                    tracing::warn!(ordinal, "Index hit has no registry entry; skipping");
                    return None;
                };
                Some(SearchHit {
                    tool: indexed.tool().clone(),
                    score,
                    schema: indexed.schema(),
                })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            query = %query,
            generation = generation.id,
            hits = hits.len(),
            "Tool search completed"
        );
        Ok(hits)
    }

    fn tool_schema(&self, tool: &dyn ToolCallback) -> Arc<str> {
        let name = &tool.definition().name;
        self.current
            .load()
            .as_ref()
            .and_then(|generation| generation.registry.schema(name))
            .unwrap_or_else(|| render_schema(tool))
    }

    fn is_indexed(&self) -> bool {
        self.current.load().is_some()
    }
}

/// Builder for a [`LexicalToolSearcher`] with custom index fields.
///
/// ```rust
/// use scopekit::search::searcher::LexicalToolSearcher;
///
/// let searcher = LexicalToolSearcher::builder()
///     .clear_index_fields()
///     .add_index_field("name", 2.0)
///     .add_index_field("tags", 1.0)
///     .build()
///     .unwrap();
/// assert_eq!(searcher.boosts().names(), vec!["name", "tags"]);
/// ```
#[derive(Default)]
pub struct LexicalToolSearcherBuilder {
    boosts: Option<FieldBoosts>,
}

impl LexicalToolSearcherBuilder {
    /// Add an index field (or update the boost of an existing one).
    pub fn add_index_field(mut self, field: &str, boost: f32) -> Self {
        self.boosts.get_or_insert_with(FieldBoosts::default).set(field, boost);
        self
    }

    /// Remove all fields, including the defaults.
    pub fn clear_index_fields(mut self) -> Self {
        self.boosts = Some(FieldBoosts::empty());
        self
    }

    pub fn build(self) -> Result<LexicalToolSearcher> {
        let boosts = self.boosts.unwrap_or_default();
        boosts.validate()?;
        Ok(LexicalToolSearcher::with_boosts(boosts))
    }
}
