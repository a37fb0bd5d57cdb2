use scopekit::api::{MAX_RESULTS_CAP, ToolSearchConfig};
use scopekit::runtime::ToolSearchRuntime;
use scopekit::search::{
    AutoIndexer, IndexOutcome, LexicalToolSearcher, SearchRequest, SearchResponse, SearchService,
};
use scopekit::traits::{ToolCallback, ToolSearcher, ToolSource};
use serde_json::Value;
use std::sync::Arc;
mod common;
use common::mock_support::StaticTool;

fn service_over(searcher: Arc<LexicalToolSearcher>) -> SearchService {
    SearchService::new(searcher)
}

#[test]
fn test_empty_query() {
    let service = service_over(Arc::new(LexicalToolSearcher::new()));
    let response = service.search(&SearchRequest::new("", 5));
    assert!(response.tools.is_empty());
    assert_eq!(response.total, 0);
    assert_eq!(response.error.as_deref(), Some("Query cannot be empty"));
}

#[test]
fn test_unindexed_search() {
    let service = service_over(Arc::new(LexicalToolSearcher::new()));
    let response = service.search(&SearchRequest::new("weather", 3));
    assert!(response.tools.is_empty());
    assert_eq!(response.total, 0);
    assert_eq!(
        response.error.as_deref(),
        Some("Tools not indexed. Please index tools first.")
    );
}

#[test]
fn test_field_boost_ranking() {
    let searcher = Arc::new(LexicalToolSearcher::new());
    searcher
        .index_tools(vec![
            StaticTool::shared("weather", "misc", "{}"),
            StaticTool::shared("misc", "weather forecast", "{}"),
        ])
        .unwrap();
    let response = service_over(searcher).search(&SearchRequest::new("weather", 5));
    let names: Vec<_> = response.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["weather", "misc"]);
    assert_eq!(response.total, 2);
    assert_eq!(response.error, None);
}

#[test]
fn test_boost_monotonicity() {
    let tools = vec![
        StaticTool::shared("t", "other", ""),
        StaticTool::shared("other", "t", ""),
    ];
    let by_name = LexicalToolSearcher::builder()
        .clear_index_fields()
        .add_index_field("name", 4.0)
        .add_index_field("description", 2.0)
        .build()
        .unwrap();
    by_name.index_tools(tools.clone()).unwrap();
    assert_eq!(by_name.search("t", 2).unwrap()[0].tool.definition().name, "t");

    let by_description = LexicalToolSearcher::builder()
        .clear_index_fields()
        .add_index_field("name", 1.0)
        .add_index_field("description", 2.0)
        .build()
        .unwrap();
    by_description.index_tools(tools).unwrap();
    assert_eq!(
        by_description.search("t", 2).unwrap()[0].tool.definition().name,
        "other"
    );
}

#[test]
fn test_identifier_query_matches_whole_name() {
    let searcher = Arc::new(LexicalToolSearcher::new());
    searcher
        .index_tools(vec![
            StaticTool::shared("get_weather", "Current conditions", ""),
            StaticTool::shared("get_time", "get the current time", ""),
            StaticTool::shared("weather_alerts", "Severe weather warnings", ""),
        ])
        .unwrap();
    let response = service_over(searcher).search(&SearchRequest::new("get_weather", 10));
    let names: Vec<_> = response.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["get_weather"]);
}

#[test]
fn test_cap_enforcement() {
    let searcher = Arc::new(LexicalToolSearcher::new());
    let tools: Vec<_> = (0..250)
        .map(|i| StaticTool::shared(&format!("x {i}"), "", ""))
        .collect();
    searcher.index_tools(tools).unwrap();
    let response = service_over(searcher).search(&SearchRequest::new("x", 1000));
    assert!(response.total <= MAX_RESULTS_CAP);
    assert_eq!(response.total, 100);
    assert_eq!(response.tools.len(), response.total);
}

#[test]
fn test_scores_non_increasing_and_bounded() {
    let searcher = LexicalToolSearcher::new();
    let tools: Vec<_> = (0..60)
        .map(|i| {
            StaticTool::shared(
                &format!("tool_{i}"),
                &"alpha beta ".repeat(i % 5 + 1),
                if i % 2 == 0 { r#"{"alpha":1}"# } else { "" },
            )
        })
        .collect();
    searcher.index_tools(tools).unwrap();
    for k in [1usize, 7, 30, 100] {
        let hits = searcher.search("alpha beta", k).unwrap();
        assert!(hits.len() <= k);
        assert!(hits.windows(2).all(|w| w[0].score >= w[1].score));
    }
}

#[test]
fn test_schema_round_trip() {
    let input_schema = r#"{"type":"object","properties":{"city":{"type":"string"}},"required":["city"]}"#;
    let searcher = Arc::new(LexicalToolSearcher::new());
    searcher
        .index_tools(vec![StaticTool::shared("get_weather", "Weather", input_schema)])
        .unwrap();
    let response = service_over(searcher).search(&SearchRequest::new("weather", 1));
    let schema: Value = serde_json::from_str(&response.tools[0].schema).unwrap();
    assert_eq!(
        schema["function"]["parameters"],
        serde_json::from_str::<Value>(input_schema).unwrap()
    );
}

#[test]
fn test_auto_indexer_self_exclusion() {
    let searcher = Arc::new(LexicalToolSearcher::new());
    let source: Arc<dyn ToolSource> = Arc::new(vec![
        StaticTool::shared("tool_search", "Search for available tools", ""),
        StaticTool::shared("web_search", "Search the web", ""),
        StaticTool::shared("file_search", "Search local files", ""),
    ]);
    let indexer = AutoIndexer::new(searcher.clone(), source, &ToolSearchConfig::default());
    assert_eq!(indexer.run(), IndexOutcome::Indexed(2));

    let hits = searcher.search("search", 100).unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits.iter().all(|h| h.tool.definition().name != "tool_search"));

    // Idempotence: the second run changes nothing.
    let before = searcher.snapshot().unwrap().id;
    assert_eq!(indexer.run(), IndexOutcome::AlreadyIndexed);
    assert_eq!(searcher.snapshot().unwrap().id, before);
}

#[test]
fn test_runtime_excludes_configured_tool_name() {
    let config = ToolSearchConfig {
        tool_name: "find_tools".to_string(),
        ..ToolSearchConfig::default()
    };
    let tools: Vec<Arc<dyn ToolCallback>> = vec![
        StaticTool::shared("find_tools", "find tools", ""),
        StaticTool::shared("find_flights", "find flights", ""),
    ];
    let runtime = ToolSearchRuntime::builder()
        .config(config)
        .tools(tools)
        .build()
        .unwrap();
    assert_eq!(runtime.search_tool().unwrap().definition().name, "find_tools");
    let response = runtime
        .search_tool()
        .unwrap()
        .service()
        .search(&SearchRequest::new("find", 10));
    let names: Vec<_> = response.tools.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["find_flights"]);
}

#[tokio::test]
async fn test_tool_call_json_contract() {
    let runtime = ToolSearchRuntime::builder()
        .tools(vec![StaticTool::shared("get_weather", "Weather lookup", "")])
        .build()
        .unwrap();
    let tool = runtime.search_tool().unwrap();

    let output = tool.call(r#"{"query":"weather","max_results":3}"#).await.unwrap();
    let value: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value["total"], 1);
    assert!(value["error"].is_null());
    assert!(value["tools"][0]["schema"].is_string());

    let output = tool.call(r#"{"max_results":3}"#).await.unwrap();
    let response: SearchResponse = serde_json::from_str(&output).unwrap();
    assert_eq!(response.error.as_deref(), Some("Query cannot be empty"));
}

#[test]
fn test_concurrent_search_and_rebuild() {
    let searcher = Arc::new(LexicalToolSearcher::new());
    let generation = |prefix: &str| -> Vec<Arc<dyn ToolCallback>> {
        (0..40)
            .map(|i| StaticTool::shared(&format!("{prefix}_{i}"), "common capability", ""))
            .collect()
    };
    let blue = generation("blue");
    let green = generation("green");
    searcher.index_tools(blue.clone()).unwrap();

    std::thread::scope(|scope| {
        for _ in 0..4 {
            let searcher = searcher.clone();
            scope.spawn(move || {
                for _ in 0..300 {
                    let hits = searcher.search("capability", 100).unwrap();
                    let first = hits[0].tool.definition().name.split('_').next().unwrap().to_string();
                    assert!(
                        hits.iter()
                            .all(|h| h.tool.definition().name.starts_with(&first)),
                        "search observed a mixed index"
                    );
                }
            });
        }
        for round in 0..30 {
            let next = if round % 2 == 0 { green.clone() } else { blue.clone() };
            searcher.index_tools(next).unwrap();
        }
    });
}
