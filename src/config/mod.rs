use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use log::LevelFilter;
use crate::core::error::MonitorError;

/// 配置结构体
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// 抓取服务根地址
    pub server_url: String,
    /// 轮询间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 横幅自动关闭前的显示时间（毫秒）
    pub alert_timeout_ms: u64,
    /// 横幅淡出时间（毫秒）
    pub alert_fade_ms: u64,
    /// 单次请求超时（秒），0 表示不设超时
    pub request_timeout_secs: u64,
    /// User-Agent
    pub user_agent: String,
    /// 日志文件，留空则输出到标准错误
    pub log_file: String,
    /// 日志级别：error / warn / info / debug / trace
    pub log_level: String,
    /// 日志文件轮转大小（字节）
    pub log_max_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:5000".to_string(),
            poll_interval_ms: 1000,
            alert_timeout_ms: 5000,
            alert_fade_ms: 150,
            request_timeout_secs: 0,
            user_agent: format!("scrapewatch/{}", env!("CARGO_PKG_VERSION")),
            log_file: "logs/scrapewatch.log".to_string(),
            log_level: "info".to_string(),
            log_max_size: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// 加载配置文件，不存在时写入默认配置
    pub fn load(path: &str) -> Result<Self, MonitorError> {
        if Path::new(path).exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)
                .map_err(|e| MonitorError::ConfigError(format!("配置文件格式错误: {}", e)))
        } else {
            let config = Config::default();
            config.save_with_tutorial(path)?;
            Ok(config)
        }
    }

    /// 保存带说明的配置文件
    pub fn save_with_tutorial(&self, path: &str) -> Result<(), MonitorError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let config_content = toml::to_string_pretty(self)
            .map_err(|e| MonitorError::ConfigError(format!("无法序列化配置: {}", e)))?;
        let full_content = format!("{}\n{}", Config::tutorial_content(), config_content);
        fs::write(path, full_content)?;
        Ok(())
    }

    fn tutorial_content() -> &'static str {
        r#"# scrapewatch 配置文件
# ====================
#
# TOML 格式。命令行参数会覆盖这里的设置，优先级：命令行 > 配置文件 > 默认值
#
# 配置文件位置：
# - Windows: %APPDATA%/scrapewatch/scrapewatch.conf
# - macOS: ~/Library/Application Support/scrapewatch/scrapewatch.conf
# - Linux: ~/.config/scrapewatch/scrapewatch.conf
#
# 使用示例：
#   scrapewatch watch 5b1e9a4c-0d7f-4a43-9c1e-2f8b6a2d3e10
#   scrapewatch watch http://127.0.0.1:5000/results/5b1e9a4c-0d7f-4a43-9c1e-2f8b6a2d3e10
#   scrapewatch submit https://example.com --depth 2 --assets
#
# server_url           抓取服务根地址
# poll_interval_ms     任务进行中时两次查询的间隔
# alert_timeout_ms     横幅显示多久后开始淡出
# alert_fade_ms        淡出动画时长，结束后横幅被移除
# request_timeout_secs 单次请求超时，0 表示一直等待
# log_file             日志文件，留空输出到标准错误
# log_level            error / warn / info / debug / trace
# log_max_size         日志文件超过此大小后轮转
"#
    }

    /// 校验配置合法性
    pub fn validate(&self) -> Result<(), MonitorError> {
        crate::core::client::parse_base_url(&self.server_url)
            .map_err(|e| MonitorError::ConfigError(format!("服务地址无效: {}", e)))?;

        if self.poll_interval_ms == 0 {
            return Err(MonitorError::ConfigError("轮询间隔必须大于0".to_string()));
        }

        if self.alert_timeout_ms == 0 {
            return Err(MonitorError::ConfigError("横幅显示时间必须大于0".to_string()));
        }

        if self.level_filter().is_none() {
            return Err(MonitorError::ConfigError(format!("未知的日志级别: {}", self.log_level)));
        }

        Ok(())
    }

    /// 合并命令行参数到配置
    pub fn merge_from_args(&mut self, args: &crate::cli::Args) {
        if let Some(server) = &args.server {
            self.server_url = server.clone();
        }
        if let Some(interval) = args.interval_ms {
            self.poll_interval_ms = interval;
        }
        if let Some(level) = &args.log_level {
            self.log_level = level.clone();
        }
        if let Some(log_file) = &args.log_file {
            self.log_file = log_file.clone();
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn alert_timeout(&self) -> Duration {
        Duration::from_millis(self.alert_timeout_ms)
    }

    pub fn alert_fade(&self) -> Duration {
        Duration::from_millis(self.alert_fade_ms)
    }

    pub fn level_filter(&self) -> Option<LevelFilter> {
        self.log_level.parse().ok()
    }

    /// 获取配置摘要信息
    pub fn get_summary(&self) -> String {
        format!(
            "配置摘要:\n\
            - 服务地址: {}\n\
            - 轮询间隔: {} 毫秒\n\
            - 横幅显示: {} 毫秒\n\
            - 请求超时: {}\n\
            - 日志: {} ({})",
            self.server_url,
            self.poll_interval_ms,
            self.alert_timeout_ms,
            if self.request_timeout_secs == 0 { "不限".to_string() } else { format!("{} 秒", self.request_timeout_secs) },
            if self.log_file.is_empty() { "标准错误" } else { self.log_file.as_str() },
            self.log_level,
        )
    }
}
