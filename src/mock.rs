#![allow(dead_code)]

//! Mock implementations for testing
//!
//! Static host tools and a scripted [`Transport`]. All types are gated with
//! `#[cfg(test)]`.

use crate::error::{Result, ScopeError};
use crate::traits::{ToolCallback, ToolDefinition, Transport, TransportResponse};
use async_trait::async_trait;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

/// Host tool with a fixed definition and optional extra indexed fields.
pub struct StaticTool {
    definition: ToolDefinition,
    extra_fields: HashMap<String, String>,
    call_count: AtomicU32,
}

impl StaticTool {
    pub fn new(name: &str, description: &str, input_schema: &str) -> Self {
        Self {
            definition: ToolDefinition::new(name, description, input_schema),
            extra_fields: HashMap::new(),
            call_count: AtomicU32::new(0),
        }
    }

    pub fn shared(name: &str, description: &str, input_schema: &str) -> Arc<dyn ToolCallback> {
        Arc::new(Self::new(name, description, input_schema))
    }

    pub fn with_field(mut self, field: &str, value: &str) -> Self {
        self.extra_fields.insert(field.to_string(), value.to_string());
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolCallback for StaticTool {
    fn definition(&self) -> &ToolDefinition {
        &self.definition
    }

    fn index_field(&self, field: &str) -> Option<Cow<'_, str>> {
        match self.extra_fields.get(field) {
            Some(value) => Some(Cow::Borrowed(value.as_str())),
            None => match field {
                "name" => Some(Cow::Borrowed(self.definition.name.as_str())),
                "description" => Some(Cow::Borrowed(self.definition.description.as_str())),
                "parameters" => Some(Cow::Borrowed(self.definition.input_schema.as_str())),
                _ => None,
            },
        }
    }

    async fn call(&self, _arguments: &str) -> Result<String> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        Ok("{}".to_string())
    }
}

/// One recorded POST.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub path: String,
    pub body: Value,
    pub headers: Vec<(String, String)>,
}

/// Transport that replays queued responses and records every request.
/// Running out of scripted responses is a test bug and yields a protocol
/// error.
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
        self.post_responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ScopeError::Protocol("No scripted POST response".into())))
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
