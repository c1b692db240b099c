//! 任务状态轮询
//!
//! 每一轮只发一次请求；任务仍在 `starting`/`running` 时等待一个固定间隔再进入下一轮，
//! 其余状态立即结束并做终态处理。获取失败不重试，弹出失败横幅后停止。
//! 取消令牌在请求或等待期间被触发时立即退出。

use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::core::client::StatusSource;
use crate::core::error::MonitorResult;
use crate::core::status::{StatusRender, TaskStatus, Tone, FETCH_FAILED_BANNER};
use crate::ui::StatusView;
use crate::utils::validator::validate_task_id;

pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// 轮询如何结束
#[derive(Debug, Clone, PartialEq)]
pub enum PollEnd {
    /// 收到终态（或未知状态）
    Finished(TaskStatus),
    Cancelled,
}

/// 一次完整轮询的统计
#[derive(Debug, Clone, PartialEq)]
pub struct PollReport {
    /// 成功渲染的轮数
    pub cycles: usize,
    /// 安排下一轮的次数
    pub reschedules: usize,
    pub end: PollEnd,
}

pub struct StatusPoller<S> {
    source: S,
    interval: Duration,
}

impl<S: StatusSource> StatusPoller<S> {
    pub fn new(source: S) -> Self {
        Self { source, interval: POLL_INTERVAL }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// 轮询直到终态、取消或获取失败。获取失败时已在视图上弹出横幅，错误原样返回
    pub async fn run<V: StatusView>(
        &self,
        task_id: &str,
        view: &mut V,
        cancel: &CancellationToken,
    ) -> MonitorResult<PollReport> {
        validate_task_id(task_id)?;
        log::info!("开始轮询任务 {} (间隔 {:?})", task_id, self.interval);

        let mut cycles = 0;
        let mut reschedules = 0;

        loop {
            let fetched = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                result = self.source.fetch_status(task_id) => Some(result),
            };
            let status = match fetched {
                None => return Ok(Self::cancelled(task_id, cycles, reschedules)),
                Some(Ok(status)) => status,
                Some(Err(e)) => {
                    log::error!("获取任务状态失败: {}", e);
                    view.show_alert(FETCH_FAILED_BANNER, Tone::Danger);
                    return Err(e);
                }
            };

            view.render(&StatusRender::from(&status));
            cycles += 1;

            let kind = status.kind();
            log::debug!("任务 {} 状态 {} 进度 {:.1}%", task_id, kind.as_str(), status.progress);

            if !kind.is_active() {
                view.finish(&kind);
                if let Some((message, tone)) = kind.finish_banner() {
                    view.show_alert(message, tone);
                }
                log::info!("任务 {} 结束: {} (共 {} 轮)", task_id, kind.as_str(), cycles);
                return Ok(PollReport { cycles, reschedules, end: PollEnd::Finished(status) });
            }

            reschedules += 1;
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(Self::cancelled(task_id, cycles, reschedules)),
                _ = tokio::time::sleep(self.interval) => {}
            }
        }
    }

    fn cancelled(task_id: &str, cycles: usize, reschedules: usize) -> PollReport {
        log::info!("任务 {} 的轮询已取消", task_id);
        PollReport { cycles, reschedules, end: PollEnd::Cancelled }
    }
}
