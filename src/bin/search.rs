//! `scopekit-search`: index tool definitions from a JSON file and run one
//! search query against them.
//!
//! Usage:
//!
//! ```text
//! scopekit-search <tools.json> <query> [--max-results N] [--config <scopekit.json>]
//! ```
//!
//! `tools.json` is an array of `{"name", "description", "input_schema"}`
//! objects; `input_schema` may be a JSON string or an inline object. The
//! tool-call response JSON is printed to stdout. Set `RUST_LOG` for logs.

use std::process;
use std::sync::Arc;

use scopekit::api::{ScopeConfig, ToolSearchConfig};
use scopekit::error::Result as ScopeResult;
use scopekit::runtime::ToolSearchRuntime;
use scopekit::search::{IndexOutcome, SearchRequest};
use scopekit::traits::{ToolCallback, ToolDefinition};
use serde::Deserialize;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    eprintln!("Usage: scopekit-search <tools.json> <query> [OPTIONS]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <tools.json>          JSON array of tool definitions");
    eprintln!("  <query>               Search query");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --max-results <N>     Maximum number of tools to return");
    eprintln!("  --config <path>       scopekit JSON config (tool_search section is used)");
    eprintln!("  --help                Show this message");
}

#[derive(Deserialize)]
struct ToolFileEntry {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    input_schema: Value,
}

/// A tool known only by its definition. Invoking it is not supported.
struct DeclaredTool {
    definition: ToolDefinition,
}

#[async_trait::async_trait]
impl ToolCallback for DeclaredTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, _arguments: &str) -> ScopeResult<String> {
        Err(scopekit::error::ScopeError::InvalidRequest(format!(
            "Tool '{}' is declaration-only",
            self.definition.name
        )))
    }
}

fn load_tools(path: &str) -> anyhow::Result<Vec<Arc<dyn ToolCallback>>> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read tools file '{path}': {e}"))?;
    let entries: Vec<ToolFileEntry> = serde_json::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("Invalid tools JSON in '{path}': {e}"))?;
    Ok(entries
        .into_iter()
        .map(|entry| {
            let input_schema = match entry.input_schema {
                Value::Null => String::new(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            Arc::new(DeclaredTool {
                definition: ToolDefinition::new(entry.name, entry.description, input_schema),
            }) as Arc<dyn ToolCallback>
        })
        .collect())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run() {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let mut positional: Vec<String> = Vec::new();
    let mut max_results: Option<i64> = None;
    let mut config_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            "--max-results" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--max-results requires a number"))?;
                max_results = Some(
                    value
                        .parse()
                        .map_err(|_| anyhow::anyhow!("Invalid --max-results value: {value}"))?,
                );
            }
            "--config" => {
                config_path = Some(
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("--config requires a path argument"))?,
                );
            }
            _ if arg.starts_with("--") => anyhow::bail!("Unknown option: {arg}"),
            _ => positional.push(arg),
        }
    }

    let [tools_path, query] = <[String; 2]>::try_from(positional).map_err(|_| {
        print_usage();
        anyhow::anyhow!("Expected <tools.json> and <query>")
    })?;

    let config: ToolSearchConfig = match config_path {
        Some(path) => ScopeConfig::from_file(&path)?.tool_search,
        None => ToolSearchConfig::default(),
    };

    let tools = load_tools(&tools_path)?;
    let runtime = ToolSearchRuntime::builder()
        .config(config)
        .tools(tools)
        .build()?;

    let Some(tool) = runtime.search_tool() else {
        anyhow::bail!("Tool search is disabled in the configuration");
    };
    if let IndexOutcome::Failed(message) = runtime.startup_outcome() {
        anyhow::bail!("Indexing failed: {message}");
    }

    let response = tool.service().search(&SearchRequest {
        query: Some(query),
        max_results,
    });
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
