//! Name-keyed store of indexed tools and their rendered schemas.

use crate::traits::ToolCallback;
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// A registered tool paired with its lazily rendered, memoized schema.
pub struct IndexedTool {
    tool: Arc<dyn ToolCallback>,
    schema: OnceLock<Arc<str>>,
}

impl IndexedTool {
    pub fn new(tool: Arc<dyn ToolCallback>) -> Self {
        Self {
            tool,
            schema: OnceLock::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.tool.definition().name
    }

    pub fn tool(&self) -> &Arc<dyn ToolCallback> {
        &self.tool
    }

    pub fn schema(&self) -> Arc<str> {
        self.schema
            .get_or_init(|| render_schema(self.tool.as_ref()))
            .clone()
    }
}

/// Render `{"type":"function","function":{"name","description","parameters"}}`.
///
/// `parameters` is the parsed input schema, or `{}` when the schema is empty
/// or not valid JSON.
pub fn render_schema(tool: &dyn ToolCallback) -> Arc<str> {
    let definition = tool.definition();
    let parameters = if definition.input_schema.trim().is_empty() {
        Value::Object(Map::new())
    } else {
        match serde_json::from_str::<Value>(&definition.input_schema) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    tool = %definition.name,
                    error = %e,
                    "Failed to parse input schema; using empty parameters"
                );
                Value::Object(Map::new())
            }
        }
    };

    let schema = json!({
        "type": "function",
        "function": {
            "name": definition.name,
            "description": definition.description,
            "parameters": parameters,
        }
    });
    Arc::from(schema.to_string())
}

/// Immutable registry for one index generation. Ordinals match the document
/// ordinals of the [`LexicalIndex`](super::index::LexicalIndex) built from the
/// same tool list.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<IndexedTool>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Build a registry from `tools`, rendering every schema up front.
    ///
    /// Tools with an empty name are skipped; for duplicate names the first
    /// registration wins.
    pub fn put_all(tools: Vec<Arc<dyn ToolCallback>>) -> Self {
        let mut registry = Self::default();
        for tool in tools {
            let name = tool.definition().name.clone();
            if name.trim().is_empty() {
                tracing::warn!("Skipping tool with empty name");
                continue;
            }
            if registry.by_name.contains_key(&name) {
                tracing::warn!(tool = %name, "Duplicate tool name; keeping first registration");
                continue;
            }
            let indexed = IndexedTool::new(tool);
            indexed.schema();
            registry.by_name.insert(name, registry.tools.len());
            registry.tools.push(indexed);
        }
        registry
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn ToolCallback>> {
        self.by_name.get(name).map(|i| self.tools[*i].tool())
    }

    pub fn schema(&self, name: &str) -> Option<Arc<str>> {
        self.by_name.get(name).map(|i| self.tools[*i].schema())
    }

    pub fn by_ordinal(&self, ordinal: usize) -> Option<&IndexedTool> {
        self.tools.get(ordinal)
    }

    pub fn tools(&self) -> &[IndexedTool] {
        &self.tools
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tools.iter().map(|t| t.name())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
