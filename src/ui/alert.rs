use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use crate::core::status::Tone;

pub const ALERT_TIMEOUT: Duration = Duration::from_millis(5000);
pub const ALERT_FADE: Duration = Duration::from_millis(150);

/// 一条可关闭的横幅
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    pub id: u64,
    pub message: String,
    pub tone: Tone,
    /// 淡出开始后为 false，随后被移除
    pub shown: bool,
}

impl Alert {
    pub fn classes(&self) -> Vec<String> {
        let mut classes = vec![
            "alert".to_string(),
            self.tone.alert_class(),
            "alert-dismissible".to_string(),
            "fade".to_string(),
        ];
        if self.shown {
            classes.push("show".to_string());
        }
        classes.push("alert-fixed".to_string());
        classes
    }
}

#[derive(Debug, Default)]
struct AlertState {
    next_id: u64,
    alerts: Vec<Alert>,
}

/// 横幅容器：每条横幅有自己的计时器，先淡出再移除，数量不设上限
#[derive(Debug, Clone)]
pub struct AlertCenter {
    state: Arc<Mutex<AlertState>>,
    timeout: Duration,
    fade: Duration,
}

impl Default for AlertCenter {
    fn default() -> Self {
        Self::new(ALERT_TIMEOUT, ALERT_FADE)
    }
}

impl AlertCenter {
    pub fn new(timeout: Duration, fade: Duration) -> Self {
        Self {
            state: Arc::new(Mutex::new(AlertState::default())),
            timeout,
            fade,
        }
    }

    fn lock(&self) -> MutexGuard<'_, AlertState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// 追加横幅并启动自动关闭计时，返回横幅ID
    pub fn show(&self, message: &str, tone: Tone) -> u64 {
        let id = {
            let mut state = self.lock();
            state.next_id += 1;
            let id = state.next_id;
            state.alerts.push(Alert {
                id,
                message: message.to_string(),
                tone,
                shown: true,
            });
            id
        };
        log::debug!("显示横幅 #{} [{}]: {}", id, tone.as_str(), message);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let center = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(center.timeout).await;
                    center.hide(id);
                    tokio::time::sleep(center.fade).await;
                    center.dismiss(id);
                });
            }
            Err(_) => log::warn!("没有可用的运行时，横幅 #{} 不会自动关闭", id),
        }
        id
    }

    fn hide(&self, id: u64) {
        if let Some(alert) = self.lock().alerts.iter_mut().find(|a| a.id == id) {
            alert.shown = false;
        }
    }

    /// 立即移除横幅（手动关闭或计时结束），已不存在时返回 false
    pub fn dismiss(&self, id: u64) -> bool {
        let mut state = self.lock();
        let before = state.alerts.len();
        state.alerts.retain(|a| a.id != id);
        state.alerts.len() != before
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.lock().alerts.clone()
    }

    pub fn len(&self) -> usize {
        self.lock().alerts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
