//! Core: 任务状态模型、HTTP 客户端、轮询循环与错误类型

pub mod client;
pub mod error;
pub mod poller;
pub mod status;

pub use client::{HttpStatusClient, StatusSource};
pub use error::{MonitorError, MonitorResult};
pub use poller::{PollEnd, PollReport, StatusPoller};
pub use status::{StatusKind, StatusRender, TaskStatus, Tone};
