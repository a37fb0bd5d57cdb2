//! Asynchronous video task pipeline: endpoint routing, submission, polling
//! and result projection.

pub mod catalog;
pub mod client;
pub mod model;
pub mod options;
pub mod poller;
pub mod result;
pub mod task;

pub use catalog::{EndpointRouter, ModelDescriptor, ModelKind};
pub use client::{Submission, VideoApi};
pub use model::{VideoModel, VideoModelBuilder};
pub use options::{InputOptions, ParametersOptions, VideoOptions, VideoPrompt};
pub use poller::TaskPoller;
pub use result::{ResultKind, VideoResult};
pub use task::{Task, TaskStatus, VideoResponse};
