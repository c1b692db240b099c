//! 任务状态数据与展示样式
//!
//! `/status/{task_id}` 返回的 JSON 在这里反序列化为 [`TaskStatus`]，
//! 再由 [`StatusRender`] 转成视图需要的纯数据。进度条与状态文字共用同一张
//! 状态→样式表 [`STATUS_STYLES`]。

use serde::{Deserialize, Serialize};
use crate::utils::format::format_bytes;

pub const COMPLETED_HINT: &str = "View the archived website in a new tab";
pub const PARTIAL_HINT: &str = "View the partially archived website";
pub const COMPLETED_BANNER: &str = "Scraping completed successfully!";
pub const FAILED_BANNER: &str = "Scraping failed. Check the errors below.";
pub const FETCH_FAILED_BANNER: &str = "Failed to update status. Please refresh the page.";

/// 服务端返回的任务状态快照
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: String,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub files_downloaded: u64,
    #[serde(default)]
    pub total_size: u64,
    /// 缺失或 null 都视为没有错误
    #[serde(default)]
    pub errors: Option<Vec<String>>,
}

impl TaskStatus {
    pub fn kind(&self) -> StatusKind {
        StatusKind::parse(&self.status)
    }

    pub fn errors(&self) -> &[String] {
        self.errors.as_deref().unwrap_or(&[])
    }

    /// 与浏览器 `Math.round` 一致：.5 向上取整
    pub fn rounded_progress(&self) -> i64 {
        (self.progress + 0.5).floor() as i64
    }
}

/// 状态标签
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusKind {
    Starting,
    Running,
    Completed,
    Failed,
    Other(String),
}

impl StatusKind {
    pub fn parse(status: &str) -> Self {
        match status {
            "starting" => StatusKind::Starting,
            "running" => StatusKind::Running,
            "completed" => StatusKind::Completed,
            "failed" => StatusKind::Failed,
            other => StatusKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            StatusKind::Starting => "starting",
            StatusKind::Running => "running",
            StatusKind::Completed => "completed",
            StatusKind::Failed => "failed",
            StatusKind::Other(s) => s,
        }
    }

    /// 仍在进行中，需要继续轮询
    pub fn is_active(&self) -> bool {
        matches!(self, StatusKind::Starting | StatusKind::Running)
    }

    pub fn tone(&self) -> Tone {
        tone_for(self.as_str())
    }

    /// 终态时下载按钮上的提示
    pub fn finish_hint(&self) -> &'static str {
        match self {
            StatusKind::Completed => COMPLETED_HINT,
            _ => PARTIAL_HINT,
        }
    }

    /// 终态横幅；除完成/失败外的终态不弹横幅
    pub fn finish_banner(&self) -> Option<(&'static str, Tone)> {
        match self {
            StatusKind::Completed => Some((COMPLETED_BANNER, Tone::Success)),
            StatusKind::Failed => Some((FAILED_BANNER, Tone::Danger)),
            _ => None,
        }
    }
}

/// 视觉色调，同时用作横幅类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Success,
    Danger,
    Info,
    Warning,
}

impl Tone {
    pub const ALL: [Tone; 4] = [Tone::Success, Tone::Danger, Tone::Warning, Tone::Info];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Success => "success",
            Tone::Danger => "danger",
            Tone::Info => "info",
            Tone::Warning => "warning",
        }
    }

    pub fn progress_class(&self) -> String {
        format!("bg-{}", self.as_str())
    }

    pub fn text_class(&self) -> String {
        format!("text-{}", self.as_str())
    }

    pub fn alert_class(&self) -> String {
        format!("alert-{}", self.as_str())
    }
}

/// 状态→色调表，未列出的状态（包括 starting）归入 Warning
pub const STATUS_STYLES: [(&str, Tone); 3] = [
    ("completed", Tone::Success),
    ("failed", Tone::Danger),
    ("running", Tone::Info),
];

pub fn tone_for(status: &str) -> Tone {
    STATUS_STYLES
        .iter()
        .find(|(name, _)| *name == status)
        .map(|(_, tone)| *tone)
        .unwrap_or(Tone::Warning)
}

/// 首字母大写
pub fn status_label(status: &str) -> String {
    let mut chars = status.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 一次渲染所需的全部数据
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRender {
    pub percent: i64,
    pub tone: Tone,
    pub label: String,
    pub files_count: String,
    pub total_size: String,
    pub errors: Vec<String>,
}

impl From<&TaskStatus> for StatusRender {
    fn from(status: &TaskStatus) -> Self {
        Self {
            percent: status.rounded_progress(),
            tone: tone_for(&status.status),
            label: status_label(&status.status),
            files_count: status.files_downloaded.to_string(),
            total_size: format_bytes(status.total_size),
            errors: status.errors().to_vec(),
        }
    }
}
