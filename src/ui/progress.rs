use indicatif::{ProgressBar, ProgressStyle};
use crate::core::status::{StatusKind, StatusRender, Tone};
use super::{alert_symbol, AlertCenter, StatusView};

// 色调对应的进度条颜色
fn bar_color(tone: Tone) -> &'static str {
    match tone {
        Tone::Success => "green",
        Tone::Danger => "red",
        Tone::Info => "cyan",
        Tone::Warning => "yellow",
    }
}

fn bar_style(tone: Tone) -> ProgressStyle {
    let template = format!(
        "{{spinner}} {{prefix:.bold}} [{{bar:40.{}/white}}] {{pos:>3}}% {{msg}}",
        bar_color(tone)
    );
    ProgressStyle::with_template(&template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ")
}

/// 终端里的任务进度视图
pub struct TerminalView {
    bar: ProgressBar,
    tone: Option<Tone>,
    errors: Vec<String>,
    hint: Option<String>,
    status_line: String,
    alerts: AlertCenter,
}

impl TerminalView {
    pub fn new(task_id: &str) -> Self {
        let bar = ProgressBar::new(100);
        bar.set_prefix(task_id.to_string());
        Self::with_bar(bar)
    }

    /// 不输出到终端，测试用
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_length(100);
        Self {
            bar,
            tone: None,
            errors: Vec::new(),
            hint: None,
            status_line: String::new(),
            alerts: AlertCenter::default(),
        }
    }

    /// 使用指定显示 / 淡出时间的横幅容器
    pub fn with_alerts(mut self, alerts: AlertCenter) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn alerts(&self) -> &AlertCenter {
        &self.alerts
    }

    // 状态行后面跟着仍在显示的横幅，已淡出的不再出现
    fn refresh_message(&self) {
        let mut message = self.status_line.clone();
        for alert in self.alerts.alerts().iter().filter(|a| a.shown) {
            if !message.is_empty() {
                message.push_str(" | ");
            }
            message.push_str(&format!("{} {}", alert_symbol(alert.tone), alert.message));
        }
        self.bar.set_message(message);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn message(&self) -> String {
        self.bar.message()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn hint(&self) -> Option<&str> {
        self.hint.as_deref()
    }

    /// 退出前收起进度条
    pub fn close(&self) {
        if !self.bar.is_finished() {
            self.bar.abandon();
        }
    }
}

impl StatusView for TerminalView {
    fn render(&mut self, update: &StatusRender) {
        if self.tone != Some(update.tone) {
            self.bar.set_style(bar_style(update.tone));
            self.tone = Some(update.tone);
        }
        self.bar.set_position(update.percent.clamp(0, 100) as u64);
        self.status_line = format!(
            "{} | 文件: {} | 大小: {}",
            update.label, update.files_count, update.total_size
        );
        self.refresh_message();

        // 错误列表整体替换，变化时才重新打印
        if self.errors != update.errors {
            self.errors = update.errors.clone();
            if !self.errors.is_empty() {
                self.bar.println(format!("错误 ({}):", self.errors.len()));
                for error in &self.errors {
                    self.bar.println(format!("  - {}", error));
                }
            }
        }
    }

    fn finish(&mut self, kind: &StatusKind) {
        let hint = kind.finish_hint().to_string();
        self.bar.println(format!("→ {}", hint));
        self.hint = Some(hint);
        self.bar.abandon();
    }

    fn show_alert(&mut self, message: &str, tone: Tone) {
        self.bar.println(format!("{} {}", alert_symbol(tone), message));
        self.alerts.show(message, tone);
        self.refresh_message();
    }
}
