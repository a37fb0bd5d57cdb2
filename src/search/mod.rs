//! Lexical tool search: analysis, the inverted index, the name registry, the
//! snapshot-swapping searcher, the tool-call service and the startup indexer.

pub mod analysis;
pub mod index;
pub mod indexer;
pub mod registry;
pub mod searcher;
pub mod service;

pub use indexer::{AutoIndexer, IndexOutcome};
pub use searcher::LexicalToolSearcher;
pub use service::{SearchRequest, SearchResponse, SearchService, ToolInfo, ToolSearchTool};
