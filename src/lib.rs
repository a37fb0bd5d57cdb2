//! Runtime tool discovery and asynchronous video task orchestration for
//! LLM applications.
//!
//! Scopekit has two independent halves:
//!
//! - **Tool search.** Host tools (named functions with JSON-schema inputs)
//!   are indexed into an in-process, multi-field lexical index. A model calls
//!   the search tool with a natural-language query and receives ready-to-use
//!   tool declarations, best match first.
//! - **Video tasks.** Video generation requests are routed to the right
//!   vendor endpoint, submitted, and polled with bounded backoff until they
//!   succeed or fail. Detection models answer inline and are never polled.
//!
//! # Key concepts
//!
//! - **[`ToolSearchRuntime`](runtime::ToolSearchRuntime)**: builds the searcher, indexes the
//!   host's tools, and hands out the [`ToolSearchTool`](search::ToolSearchTool).
//! - **[`ToolSearcher`](traits::ToolSearcher)**: the indexing/search seam, implemented by
//!   [`LexicalToolSearcher`](search::LexicalToolSearcher).
//! - **[`VideoModel`](video::VideoModel)**: merges options, submits, polls, and projects a
//!   [`VideoResult`](video::VideoResult).
//! - **[`Transport`](traits::Transport)**: the HTTP seam; [`HttpTransport`](transport::HttpTransport)
//!   is the default implementation (feature `transport-reqwest`).
//!
//! # Quick start
//!
//! ```rust,no_run
//! use scopekit::api::ScopeConfig;
//! use scopekit::runtime::ToolSearchRuntime;
//! use scopekit::traits::ToolCallback;
//! use std::sync::Arc;
//!
//! # async fn example(host_tools: Vec<Arc<dyn ToolCallback>>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScopeConfig::from_file("scopekit.json")?;
//! let runtime = ToolSearchRuntime::builder()
//!     .config(config.tool_search)
//!     .tools(host_tools)
//!     .build()?;
//!
//! if let Some(search) = runtime.search_tool() {
//!     let response = search.call(r#"{"query": "weather", "max_results": 3}"#).await?;
//!     println!("{response}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
mod options_validation;
pub mod reliability;
pub mod runtime;
pub mod search;
pub mod traits;
pub mod transport;
pub mod video;

#[cfg(test)]
mod mock;
