#![allow(dead_code)]

use async_trait::async_trait;
use scopekit::api::RetryConfig;
use scopekit::error::{Result, ScopeError};
use scopekit::traits::{ToolCallback, ToolDefinition, Transport, TransportResponse};
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Host tool with a fixed definition.
pub struct StaticTool {
    definition: ToolDefinition,
}

impl StaticTool {
    pub fn shared(name: &str, description: &str, input_schema: &str) -> Arc<dyn ToolCallback> {
        Arc::new(Self {
            definition: ToolDefinition::new(name, description, input_schema),
        })
    }
}

#[async_trait]
impl ToolCallback for StaticTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    async fn call(&self, _arguments: &str) -> Result<String> {
        Ok("{}".to_string())
    }
}

#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub path: String,
    pub body: Value,
    pub headers: Vec<(String, String)>,
}

/// Transport replaying scripted responses and recording every request.
#[derive(Default)]
pub struct MockTransport {
    post_responses: Mutex<VecDeque<Result<TransportResponse>>>,
    get_responses: Mutex<VecDeque<Result<TransportResponse>>>,
    posts: Mutex<Vec<RecordedPost>>,
    gets: Mutex<Vec<String>>,
    get_delay_ms: u64,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_get_delay(mut self, delay_ms: u64) -> Self {
        self.get_delay_ms = delay_ms;
        self
    }

    pub fn push_post(&self, response: TransportResponse) {
        self.post_responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_get(&self, response: TransportResponse) {
        self.get_responses.lock().unwrap().push_back(Ok(response));
    }

    pub fn push_get_error(&self, error: ScopeError) {
        self.get_responses.lock().unwrap().push_back(Err(error));
    }

    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().unwrap().clone()
    }

    pub fn gets(&self) -> Vec<String> {
        self.gets.lock().unwrap().clone()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn get_count(&self) -> usize {
        self.gets.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post(
        &self,
        path: &str,
        body: &Value,
        headers: &[(&str, &str)],
    ) -> Result<TransportResponse> {
        self.posts.lock().unwrap().push(RecordedPost {
            path: path.to_string(),
            body: body.clone(),
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        let next = self.post_responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(ScopeError::Protocol("No scripted POST response".into())))
    }

    async fn get(&self, path: &str, _params: &[(&str, &str)]) -> Result<TransportResponse> {
        self.gets.lock().unwrap().push(path.to_string());
        if self.get_delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.get_delay_ms)).await;
        }
        let next = self.get_responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(ScopeError::Protocol("No scripted GET response".into())))
    }
}

/// A task envelope with `task_id` and `task_status`.
pub fn task_status(task_id: &str, status: &str) -> TransportResponse {
    TransportResponse::ok(json!({
        "request_id": "req-1",
        "output": {"task_id": task_id, "task_status": status}
    }))
}

/// Retry policy with millisecond backoff for tests.
pub fn fast_retry(max_attempts: u32) -> RetryConfig {
    RetryConfig {
        max_attempts,
        initial_backoff_ms: 1,
        multiplier: 1.0,
        max_backoff_ms: 1,
    }
}
