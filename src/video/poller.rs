//! Drives a submitted task to a terminal state.

use crate::api::RetryConfig;
use crate::error::{Result, ScopeError};
use crate::reliability::retry_with_backoff;
use crate::video::client::VideoApi;
use crate::video::task::{Task, TaskStatus};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// Polls the query endpoint under a bounded retry policy.
///
/// Non-terminal statuses and transient transport faults are retried. A status
/// that moves backwards (e.g. RUNNING then PENDING) is logged and ignored: the
/// task keeps the furthest state it reached. Unknown statuses are a protocol
/// error.
#[derive(Debug, Clone, Default)]
pub struct TaskPoller {
    retry: RetryConfig,
}

impl TaskPoller {
    pub fn new(retry: RetryConfig) -> Self {
        Self { retry }
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// Poll until `task` SUCCEEDED (returned with its payload), FAILED
    /// ([`ScopeError::TaskFailed`]), the budget runs out
    /// ([`ScopeError::TaskTimeout`]) or `cancel` fires
    /// ([`ScopeError::Cancelled`]).
    pub async fn poll(&self, api: &VideoApi, task: Task, cancel: &CancellationToken) -> Result<Task> {
        let task_id = task.task_id.clone();
        let observed = Mutex::new(task);

        retry_with_backoff(
            &self.retry,
            cancel,
            "video_task.poll",
            ScopeError::is_retryable,
            |attempt| {
                let task_id = task_id.as_str();
                let observed = &observed;
                async move {
                    let response = api.query(task_id).await?;
                    metrics::counter!("video_task.polls").increment(1);

                    let status = response.status().ok_or_else(|| {
                        ScopeError::Protocol(format!("Task {} response has no task_status", task_id))
                    })?;
                    if status == TaskStatus::Unknown {
                        return Err(ScopeError::Protocol(format!(
                            "Task {} reported an unknown status",
                            task_id
                        )));
                    }

                    let mut task = observed
                        .lock()
                        .unwrap_or_else(|poisoned| poisoned.into_inner());
                    if status.rank() < task.status.rank() {
                        tracing::warn!(
                            task_id = %task_id,
                            previous = %task.status,
                            reported = %status,
                            "Task status regressed; keeping previous state"
                        );
                        return Err(pending(task_id, task.status));
                    }
                    task.observe(status, &response);
                    tracing::debug!(task_id = %task_id, attempt, status = %status, "Polled video task");

                    match status {
                        TaskStatus::Succeeded => {
                            tracing::info!(task_id = %task_id, attempts = attempt, "Video generation task completed");
                            Ok(task.clone())
                        }
                        TaskStatus::Failed => {
                            let code = task.error_code.clone().unwrap_or_default();
                            let message = task.error_message.clone().unwrap_or_default();
                            tracing::error!(task_id = %task_id, code = %code, message = %message, "Video generation task failed");
                            Err(ScopeError::TaskFailed { code, message })
                        }
                        _ => Err(pending(task_id, status)),
                    }
                }
            },
        )
        .await
    }
}

fn pending(task_id: &str, status: TaskStatus) -> ScopeError {
    ScopeError::TransientPending {
        task_id: task_id.to_string(),
        status: status.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::VideoConfig;
    use crate::mock::MockTransport;
    use crate::traits::TransportResponse;
    use crate::video::task::VideoResponse;
    use serde_json::json;
    use std::sync::Arc;

    fn status(s: &str) -> TransportResponse {
        TransportResponse::ok(json!({"output": {"task_id": "T1", "task_status": s}}))
    }

    fn fast_poller(max_attempts: u32) -> TaskPoller {
        TaskPoller::new(RetryConfig {
            max_attempts,
            initial_backoff_ms: 1,
            multiplier: 1.0,
            max_backoff_ms: 1,
        })
    }

    fn setup(responses: Vec<TransportResponse>) -> (Arc<MockTransport>, VideoApi) {
        let transport = Arc::new(MockTransport::new());
        for r in responses {
            transport.push_get(r);
        }
        let api = VideoApi::from_config(transport.clone(), &VideoConfig::default()).unwrap();
        (transport, api)
    }

    fn new_task() -> Task {
        Task::pending("T1", &VideoResponse::default())
    }

    #[tokio::test]
    async fn regression_keeps_furthest_state() {
        let (transport, api) = setup(vec![
            status("RUNNING"),
            status("PENDING"),
            TransportResponse::ok(json!({"output": {"task_id": "T1", "task_status": "SUCCEEDED", "video_url": "U"}})),
        ]);
        let task = fast_poller(5)
            .poll(&api, new_task(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Succeeded);
        assert_eq!(transport.get_count(), 3);
    }

    #[tokio::test]
    async fn unknown_status_is_fatal() {
        let (transport, api) = setup(vec![status("CANCELED"), status("SUCCEEDED")]);
        let err = fast_poller(5)
            .poll(&api, new_task(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ScopeError::Protocol(_)));
        assert_eq!(transport.get_count(), 1);
    }

    #[tokio::test]
    async fn transient_transport_is_retried() {
        let (transport, api) = setup(vec![
            TransportResponse {
                status: 503,
                body: None,
            },
            status("SUCCEEDED"),
        ]);
        let task = fast_poller(5)
            .poll(&api, new_task(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(task.status, TaskStatus::Succeeded);
        assert_eq!(transport.get_count(), 2);
    }

    #[tokio::test]
    async fn client_error_is_fatal() {
        let (transport, api) = setup(vec![
            TransportResponse {
                status: 404,
                body: None,
            },
            status("SUCCEEDED"),
        ]);
        let err = fast_poller(5)
            .poll(&api, new_task(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ScopeError::Api { status: 404, .. }));
        assert_eq!(transport.get_count(), 1);
    }

    #[tokio::test]
    async fn budget_exhaustion_is_timeout() {
        let (transport, api) = setup(vec![status("PENDING"); 3]);
        let err = fast_poller(3)
            .poll(&api, new_task(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ScopeError::TaskTimeout { attempts: 3 }));
        assert_eq!(transport.get_count(), 3);
    }
}
