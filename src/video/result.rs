//! Caller-facing projection of a finished video request.

use crate::error::{Result, ScopeError};
use crate::video::client::Submission;
use crate::video::task::{Task, TaskStatus, VideoResponse};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    /// Synchronous detection answer from the submit call.
    Detection,
    /// Completed generation task.
    Generation,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoResult {
    pub kind: ResultKind,
    /// Absent for detection answers that carry no task id.
    pub task_id: Option<String>,
    /// `output.video_url`, else `output.results.video_url`.
    pub video_url: Option<String>,
    pub response: VideoResponse,
}

impl VideoResult {
    pub fn detection(response: VideoResponse) -> Self {
        let output = response.output.as_ref();
        Self {
            kind: ResultKind::Detection,
            task_id: output.and_then(|o| o.task_id()).map(str::to_string),
            video_url: output.and_then(|o| o.video_url()).map(str::to_string),
            response,
        }
    }

    /// Project a SUCCEEDED task. Any other state is a protocol error.
    pub fn generation(task: Task) -> Result<Self> {
        if task.status != TaskStatus::Succeeded {
            return Err(ScopeError::Protocol(format!(
                "Task {} is {}, not SUCCEEDED",
                task.task_id, task.status
            )));
        }
        let response = task.payload.unwrap_or_default();
        let video_url = response
            .output
            .as_ref()
            .and_then(|o| o.video_url())
            .map(str::to_string);
        Ok(Self {
            kind: ResultKind::Generation,
            task_id: Some(task.task_id),
            video_url,
            response,
        })
    }

    /// Project a terminal submission; accepted tasks must be polled first.
    pub fn from_submission(submission: Submission) -> Result<Self> {
        match submission {
            Submission::Detected { task, .. } => {
                Ok(Self::detection(task.payload.unwrap_or_default()))
            }
            Submission::Accepted { task, .. } => Self::generation(task),
        }
    }

    pub fn is_detection(&self) -> bool {
        self.kind == ResultKind::Detection
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> VideoResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn detection_keeps_body() {
        let result = VideoResult::detection(response(json!({
            "request_id": "r",
            "output": {"check_pass": true, "bbox_face": [1, 2, 3, 4]}
        })));
        assert!(result.is_detection());
        assert_eq!(result.task_id, None);
        assert_eq!(
            result.response.output.unwrap().bbox_face,
            Some(vec![1, 2, 3, 4])
        );
    }

    #[test]
    fn generation_reads_nested_video_url() {
        let mut task = Task::pending("T1", &VideoResponse::default());
        task.status = TaskStatus::Succeeded;
        task.payload = Some(response(json!({
            "output": {"task_id": "T1", "task_status": "SUCCEEDED", "results": {"video_url": "U"}}
        })));
        let result = VideoResult::generation(task).unwrap();
        assert_eq!(result.kind, ResultKind::Generation);
        assert_eq!(result.task_id.as_deref(), Some("T1"));
        assert_eq!(result.video_url.as_deref(), Some("U"));
    }

    #[test]
    fn unfinished_task_cannot_be_projected() {
        let task = Task::pending("T1", &VideoResponse::default());
        assert!(matches!(
            VideoResult::generation(task),
            Err(ScopeError::Protocol(_))
        ));
    }
}
