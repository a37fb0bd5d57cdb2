//! Submit and query calls against the video API.

use crate::api::VideoConfig;
use crate::error::{Result, ScopeError};
use crate::traits::Transport;
use crate::transport::check_status;
use crate::video::catalog::{EndpointRouter, ModelDescriptor, ModelKind};
use crate::video::options::VideoOptions;
use crate::video::task::{Task, VideoResponse};
use serde_json::json;
use std::sync::Arc;

/// Header asking the vendor to run the request as an asynchronous task.
pub const ASYNC_HEADER: (&str, &str) = ("X-DashScope-Async", "enable");

/// What a submit produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    /// A detection model answered inline. The task is already SUCCEEDED and
    /// carries the response as its payload.
    Detected {
        descriptor: ModelDescriptor,
        task: Task,
    },
    /// A generation task was accepted and must be polled.
    Accepted {
        descriptor: ModelDescriptor,
        task: Task,
    },
}

impl Submission {
    pub fn task(&self) -> &Task {
        match self {
            Self::Detected { task, .. } | Self::Accepted { task, .. } => task,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.task().status.is_terminal()
    }

    pub fn descriptor(&self) -> &ModelDescriptor {
        match self {
            Self::Detected { descriptor, .. } | Self::Accepted { descriptor, .. } => descriptor,
        }
    }
}

/// Thin client over a [`Transport`]: routes models to endpoints, submits
/// tasks and queries their state.
pub struct VideoApi {
    transport: Arc<dyn Transport>,
    router: EndpointRouter,
    query_task_path: String,
}

impl VideoApi {
    pub fn new(
        transport: Arc<dyn Transport>,
        router: EndpointRouter,
        query_task_path: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            router,
            query_task_path: query_task_path.into(),
        }
    }

    /// Client with the built-in catalog and the paths from `config`.
    pub fn from_config(transport: Arc<dyn Transport>, config: &VideoConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            transport,
            EndpointRouter::dashscope(config.video_path.clone())?,
            config.query_task_path.clone(),
        ))
    }

    pub fn router(&self) -> &EndpointRouter {
        &self.router
    }

    /// POST `options` to the endpoint serving its model.
    ///
    /// Detection models return their body directly. For generation models the
    /// envelope must carry `output.task_id`.
    pub async fn submit(&self, options: &VideoOptions) -> Result<Submission> {
        let model = options.model_or_default();
        let descriptor = self.router.resolve(model);
        let body = json!({
            "model": model,
            "input": options.input,
            "parameters": options.parameters,
        });
        let headers: &[(&str, &str)] = match descriptor.kind {
            ModelKind::AsyncGeneration => &[ASYNC_HEADER],
            ModelKind::SyncDetection => &[],
        };

        tracing::debug!(
            model = %model,
            path = %descriptor.endpoint_path,
            kind = ?descriptor.kind,
            "Submitting video request"
        );
        let response = self
            .transport
            .post(&descriptor.endpoint_path, &body, headers)
            .await?;
        let response = check_status("video", response)?;
        let envelope = match response.body {
            Some(body) => Some(decode(body)?),
            None => None,
        };

        if descriptor.kind == ModelKind::SyncDetection {
            tracing::info!(model = %model, "Video detection completed");
            if envelope.is_none() {
                tracing::warn!(model = %model, "Detection response had no body");
            }
            return Ok(Submission::Detected {
                descriptor,
                task: Task::completed(envelope.unwrap_or_default()),
            });
        }

        let Some(envelope) = envelope else {
            tracing::error!(model = %model, "Failed to submit video generation task: null response");
            return Err(ScopeError::SubmitRejected("null response".to_string()));
        };
        let Some(task_id) = envelope.output.as_ref().and_then(|o| o.task_id()) else {
            tracing::error!(model = %model, response = ?envelope, "Failed to submit video generation task");
            return Err(ScopeError::SubmitRejected("invalid output".to_string()));
        };

        let task = Task::pending(task_id, &envelope);
        tracing::info!(model = %model, task_id = %task.task_id, "Video generation task submitted");
        Ok(Submission::Accepted { descriptor, task })
    }

    /// GET the current state of `task_id`.
    pub async fn query(&self, task_id: &str) -> Result<VideoResponse> {
        let path = self.query_task_path.replace("{task_id}", task_id);
        let response = self.transport.get(&path, &[]).await?;
        let response = check_status("video", response)?;
        match response.body {
            Some(body) => decode(body),
            None => Err(ScopeError::Protocol(format!(
                "Empty query response for task {}",
                task_id
            ))),
        }
    }
}

fn decode(body: serde_json::Value) -> Result<VideoResponse> {
    serde_json::from_value(body)
        .map_err(|e| ScopeError::Protocol(format!("Malformed video response: {}", e)))
}
