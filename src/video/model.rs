//! The video model façade: merge options, submit, poll, project.

use crate::api::VideoConfig;
use crate::error::{Result, ScopeError};
use crate::options_validation::validate_video_options;
use crate::traits::Transport;
use crate::video::catalog::EndpointRouter;
use crate::video::client::{Submission, VideoApi};
use crate::video::options::{VideoOptions, VideoPrompt};
use crate::video::poller::TaskPoller;
use crate::video::result::VideoResult;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Entry point for video generation and detection.
///
/// Obtain one via [`VideoModel::builder()`]:
///
/// ```rust,no_run
/// use scopekit::api::VideoConfig;
/// use scopekit::transport::HttpTransport;
/// use scopekit::video::{VideoModel, VideoPrompt};
/// use std::sync::Arc;
///
/// # async fn example() -> scopekit::error::Result<()> {
/// let config = VideoConfig::default();
/// let model = VideoModel::builder()
///     .transport(Arc::new(HttpTransport::from_config(&config)?))
///     .config(config)
///     .build()?;
/// let result = model.call(VideoPrompt::new("a cat surfing at sunset")).await?;
/// println!("{:?}", result.video_url);
/// # Ok(())
/// # }
/// ```
pub struct VideoModel {
    api: VideoApi,
    poller: TaskPoller,
    defaults: VideoOptions,
}

impl VideoModel {
    pub fn builder() -> VideoModelBuilder {
        VideoModelBuilder::default()
    }

    pub fn api(&self) -> &VideoApi {
        &self.api
    }

    pub fn defaults(&self) -> &VideoOptions {
        &self.defaults
    }

    pub async fn call(&self, prompt: VideoPrompt) -> Result<VideoResult> {
        self.call_with_cancel(prompt, &CancellationToken::new()).await
    }

    /// Like [`call`](Self::call); cancelling `cancel` abandons the poll loop
    /// with [`ScopeError::Cancelled`].
    pub async fn call_with_cancel(
        &self,
        prompt: VideoPrompt,
        cancel: &CancellationToken,
    ) -> Result<VideoResult> {
        let options = prompt.into_options(&self.defaults)?;
        let model = options.model_or_default().to_string();
        validate_video_options(&model, &options)?;

        let start = Instant::now();
        let result = self.run(&options, cancel).await;

        let status = match &result {
            Ok(r) if r.is_detection() => "detected",
            Ok(_) => "succeeded",
            Err(ScopeError::TaskTimeout { .. }) => "timeout",
            Err(ScopeError::Cancelled) => "cancelled",
            Err(_) => "failed",
        };
        metrics::counter!("video_task.total", "model" => model.clone(), "status" => status)
            .increment(1);
        metrics::histogram!("video_task.duration_seconds", "model" => model.clone())
            .record(start.elapsed().as_secs_f64());
        if let Err(e) = &result {
            tracing::error!(model = %model, error = %e, "Video request failed");
        }
        result
    }

    async fn run(&self, options: &VideoOptions, cancel: &CancellationToken) -> Result<VideoResult> {
        if cancel.is_cancelled() {
            return Err(ScopeError::Cancelled);
        }
        let submission = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ScopeError::Cancelled),
            submission = self.api.submit(options) => submission?,
        };
        match submission {
            Submission::Accepted { task, .. } => {
                let task = self.poller.poll(&self.api, task, cancel).await?;
                VideoResult::generation(task)
            }
            detected => VideoResult::from_submission(detected),
        }
    }
}

#[derive(Default)]
pub struct VideoModelBuilder {
    transport: Option<Arc<dyn Transport>>,
    config: VideoConfig,
    router: Option<EndpointRouter>,
}

impl VideoModelBuilder {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Paths, default options and retry policy.
    pub fn config(mut self, config: VideoConfig) -> Self {
        self.config = config;
        self
    }

    pub fn default_options(mut self, options: VideoOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn retry(mut self, retry: crate::api::RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    /// Replace the built-in endpoint catalog.
    pub fn router(mut self, router: EndpointRouter) -> Self {
        self.router = Some(router);
        self
    }

    pub fn build(self) -> Result<VideoModel> {
        self.config.validate()?;
        let transport = self
            .transport
            .ok_or_else(|| ScopeError::Config("Video model requires a transport".to_string()))?;
        let router = match self.router {
            Some(router) => router,
            None => EndpointRouter::dashscope(self.config.video_path.clone())?,
        };
        Ok(VideoModel {
            api: VideoApi::new(transport, router, self.config.query_task_path.clone()),
            poller: TaskPoller::new(self.config.retry),
            defaults: self.config.options,
        })
    }
}
