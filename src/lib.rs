//! scrapewatch: 网站抓取任务的状态轮询客户端
//!
//! 轮询 `/status/{task_id}`，把任务进度渲染到视图上（终端进度条或结果页元素模型），
//! 任务结束后停止。

pub mod cli;
pub mod config;
pub mod core;
pub mod ui;
pub mod utils;

pub use crate::core::{MonitorError, MonitorResult, StatusPoller, TaskStatus};
pub use crate::utils::format::{format_bytes, format_bytes_with};
