pub mod alert;
pub mod page;
mod progress;

use std::fmt;
use crate::core::status::{StatusKind, StatusRender, TaskStatus, Tone};
use crate::utils::format::format_bytes;

pub use alert::{Alert, AlertCenter};
pub use page::Page;
pub use progress::TerminalView;

/// 轮询器驱动的视图
pub trait StatusView {
    /// 每轮成功获取后调用，覆盖之前显示的全部内容
    fn render(&mut self, update: &StatusRender);

    /// 任务进入终态：启用查看按钮并附上提示
    fn finish(&mut self, kind: &StatusKind);

    fn show_alert(&mut self, message: &str, tone: Tone);
}

pub fn print_success(message: &str) {
    println!("✓ {}", message);
}

pub fn print_error(message: &str) {
    println!("✗ {}", message);
}

pub fn alert_symbol(tone: Tone) -> &'static str {
    match tone {
        Tone::Success => "✓",
        Tone::Danger => "✗",
        Tone::Info => "ℹ",
        Tone::Warning => "⚠",
    }
}

pub struct TaskSummary {
    pub task_id: String,
    pub status: TaskStatus,
    pub cycles: usize,
    pub elapsed_time: std::time::Duration,
}

impl fmt::Display for TaskSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n任务摘要:")?;
        writeln!(f, "任务ID: {}", self.task_id)?;
        writeln!(f, "状态: {}", crate::core::status::status_label(&self.status.status))?;
        writeln!(f, "已下载文件: {}", self.status.files_downloaded)?;
        writeln!(f, "总大小: {}", format_bytes(self.status.total_size))?;
        writeln!(f, "错误数: {}", self.status.errors().len())?;
        writeln!(f, "轮询次数: {}", self.cycles)?;
        writeln!(f, "耗时: {:.2}秒", self.elapsed_time.as_secs_f64())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_display() {
        let summary = TaskSummary {
            task_id: "abc".to_string(),
            status: TaskStatus {
                status: "completed".to_string(),
                progress: 100.0,
                files_downloaded: 12,
                total_size: 1536,
                errors: Some(vec!["x".to_string()]),
            },
            cycles: 3,
            elapsed_time: std::time::Duration::from_millis(2500),
        };
        let text = summary.to_string();
        assert!(text.contains("状态: Completed"));
        assert!(text.contains("总大小: 1.5 KB"));
        assert!(text.contains("错误数: 1"));
        assert!(text.contains("耗时: 2.50秒"));
    }
}
