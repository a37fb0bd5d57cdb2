//! Wire envelope of the video API and the task state derived from it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Remote task status. Anything the vendor adds later decodes as
/// [`Unknown`](Self::Unknown).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Position in the lifecycle; statuses never move to a lower rank.
    pub(crate) fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Running => 1,
            Self::Succeeded | Self::Failed => 2,
            Self::Unknown => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoResultUrl {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

/// The `output` object. Generation tasks fill the task fields; detection
/// models fill the check fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_status: Option<TaskStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submit_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orig_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<VideoResultUrl>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_pass: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humanoid: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pass: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bbox_face: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_bbox_face: Option<Vec<i64>>,
    /// Fields this crate does not model, kept for the caller.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VideoOutput {
    /// `output.video_url`, else `output.results.video_url`.
    pub fn video_url(&self) -> Option<&str> {
        self.video_url
            .as_deref()
            .or_else(|| self.results.as_ref().and_then(|r| r.video_url.as_deref()))
    }

    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_video_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_video_duration: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_count: Option<i64>,
    #[serde(rename = "SR", skip_serializing_if = "Option::is_none")]
    pub sr: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_ratio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_duration: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_count: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Envelope shared by submit and query responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<VideoOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<VideoUsage>,
}

impl VideoResponse {
    pub fn status(&self) -> Option<TaskStatus> {
        self.output.as_ref().and_then(|o| o.task_status)
    }
}

/// One outstanding or finished generation job as seen by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub task_id: String,
    pub status: TaskStatus,
    pub submit_time: Option<String>,
    pub end_time: Option<String>,
    /// Terminal payload, present once the task SUCCEEDED.
    pub payload: Option<VideoResponse>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
}

impl Task {
    /// A freshly submitted task.
    pub fn pending(task_id: impl Into<String>, submit: &VideoResponse) -> Self {
        let output = submit.output.as_ref();
        Self {
            task_id: task_id.into(),
            status: TaskStatus::Pending,
            submit_time: output.and_then(|o| o.submit_time.clone()),
            end_time: None,
            payload: None,
            error_code: None,
            error_message: None,
        }
    }

    /// A task that finished inside the submit call. Detection answers carry
    /// no task id of their own, so the request id stands in when present.
    pub fn completed(response: VideoResponse) -> Self {
        let task_id = response
            .output
            .as_ref()
            .and_then(|o| o.task_id())
            .or(response.request_id.as_deref())
            .unwrap_or_default()
            .to_string();
        let mut task = Self::pending(task_id, &response);
        task.observe(TaskStatus::Succeeded, &response);
        task.payload = Some(response);
        task
    }

    /// Fold an observed poll response into this task.
    pub(crate) fn observe(&mut self, status: TaskStatus, response: &VideoResponse) {
        self.status = status;
        let Some(output) = response.output.as_ref() else {
            return;
        };
        if output.submit_time.is_some() {
            self.submit_time = output.submit_time.clone();
        }
        self.end_time = output.end_time.clone();
        match status {
            TaskStatus::Succeeded => self.payload = Some(response.clone()),
            TaskStatus::Failed => {
                self.error_code = output.code.clone();
                self.error_message = output.message.clone();
            }
            _ => {}
        }
    }
}
