//! Error types shared by the tool-search and video-task subsystems.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ScopeError>;

/// Unified error type for configuration, search, transport and task failures.
///
/// Variants are grouped by *kind* so that callers (and the retry harness) can
/// decide between retrying, reporting, and giving up without inspecting
/// provider-specific payloads.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// Invalid or missing configuration (bad boost, unknown key, missing env var).
    #[error("Configuration error: {0}")]
    Config(String),

    /// A caller-supplied request or option set is malformed.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A search was attempted before any index snapshot was committed.
    #[error("Tools not indexed")]
    IndexNotReady,

    /// The text-analysis or scoring backend failed.
    #[error("Internal search error: {0}")]
    InternalSearch(String),

    /// The vendor accepted the HTTP call but the submit envelope is unusable.
    #[error("Failed to submit video generation task: {0}")]
    SubmitRejected(String),

    /// A polled task has not reached a terminal state yet.
    #[error("Task {task_id} is still {status}")]
    TransientPending { task_id: String, status: String },

    /// Network failure, timeout, HTTP 429 or HTTP 5xx.
    #[error("Transient transport error: {0}")]
    TransientTransport(String),

    /// The remote API returned HTTP 401/403.
    #[error("Unauthorized")]
    Unauthorized,

    /// The remote API returned a non-retryable HTTP status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The task reached the terminal FAILED state.
    #[error("Video generation task failed: {code}: {message}")]
    TaskFailed { code: String, message: String },

    /// The retry budget was exhausted before the task reached a terminal state.
    #[error("Task did not reach a terminal state after {attempts} attempts")]
    TaskTimeout { attempts: u32 },

    /// The remote broke the protocol (malformed payload, unknown status).
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// The caller cancelled the operation.
    #[error("Cancelled")]
    Cancelled,
}

impl ScopeError {
    /// Returns `true` for the two transient kinds the retry harness consumes:
    /// [`TransientPending`](Self::TransientPending) and
    /// [`TransientTransport`](Self::TransientTransport).
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::TransientPending { .. } | Self::TransientTransport(_)
        )
    }
}
