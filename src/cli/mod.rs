//! CLI: 命令行接口和参数解析模块
//!
//! ## 支持的命令
//!
//! - 按任务ID轮询：`scrapewatch watch <task_id>`
//! - 按结果页轮询：`scrapewatch watch http://host/results/<task_id>`
//! - 提交并轮询：`scrapewatch submit https://example.com --depth 2 --assets`
//! - 编辑配置：`scrapewatch -e` / `scrapewatch --edit-config`
//!
//! ## 平台支持
//!
//! - Windows: `%APPDATA%/scrapewatch/scrapewatch.conf`
//! - macOS: `~/Library/Application Support/scrapewatch/scrapewatch.conf`
//! - Linux: `~/.config/scrapewatch/scrapewatch.conf`

use clap::{Parser, Subcommand};
use std::env;
use std::path::Path;
use url::Url;
use crate::config::Config;
use crate::core::client::{task_id_from_results_url, HttpStatusClient};
use crate::core::error::MonitorError;
use crate::ui::page::extract_task_id;
use crate::utils::validator::{validate_task_id, ScrapeForm};

/// 获取平台默认配置文件路径
pub fn default_config_path() -> String {
    #[cfg(target_os = "windows")]
    {
        let appdata = env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        format!("{}/scrapewatch/scrapewatch.conf", appdata)
    }
    #[cfg(target_os = "macos")]
    {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{}/Library/Application Support/scrapewatch/scrapewatch.conf", home)
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{}/.config/scrapewatch/scrapewatch.conf", home)
    }
}

/// 打开配置文件编辑器
pub fn open_config_in_editor(config_path: &str) {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("notepad").arg(config_path).status().ok();
    }
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg("-e").arg(config_path).status().ok();
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        // 优先 xdg-open，否则 nano
        if std::process::Command::new("xdg-open").arg(config_path).status().is_err() {
            let _ = std::process::Command::new("nano").arg(config_path).status();
        }
    }
}

/// scrapewatch 命令行参数
///
/// 示例用法：
///   scrapewatch watch 5b1e9a4c-0d7f-4a43-9c1e-2f8b6a2d3e10
///   scrapewatch submit https://example.com -d 2 -a
///   scrapewatch -e  # 编辑配置文件
#[derive(Parser, Debug, Clone)]
#[command(
    name = "scrapewatch",
    author = "panzhifu",
    version = env!("CARGO_PKG_VERSION"),
    about = "网站抓取任务的状态轮询客户端",
    long_about = "查询抓取服务上任务的进度，实时显示进度条、统计和错误列表，任务结束后自动退出。\n\n运行中按 'q' 或 Ctrl-C 停止轮询。\n"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// 配置文件路径，默认为平台推荐路径
    #[arg(short = 'c', long, global = true, default_value_t = default_config_path())]
    pub config: String,

    /// 用系统默认编辑器打开配置文件并退出
    #[arg(short = 'e', long = "edit-config")]
    pub edit_config: bool,

    /// 抓取服务根地址，覆盖配置文件
    #[arg(short = 's', long, global = true)]
    pub server: Option<String>,

    /// 轮询间隔（毫秒），覆盖配置文件
    #[arg(short = 'i', long, global = true)]
    pub interval_ms: Option<u64>,

    /// 日志级别，覆盖配置文件
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// 日志文件，传空字符串则输出到标准错误
    #[arg(long, global = true)]
    pub log_file: Option<String>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// 轮询已有任务，参数可以是任务ID或结果页地址
    Watch {
        target: String,
    },
    /// 提交抓取表单，然后轮询新任务
    Submit {
        /// 要抓取的网站
        url: String,
        /// 抓取深度（1-5）
        #[arg(short = 'd', long, default_value_t = 1)]
        depth: u32,
        /// 同时下载图片、样式表等资源
        #[arg(short = 'a', long)]
        assets: bool,
    },
}

/// `watch` 的目标
#[derive(Debug, Clone, PartialEq)]
pub enum WatchTarget {
    TaskId(String),
    ResultsPage(Url),
}

impl WatchTarget {
    pub fn parse(target: &str) -> Result<Self, MonitorError> {
        if target.starts_with("http://") || target.starts_with("https://") {
            return Ok(WatchTarget::ResultsPage(Url::parse(target)?));
        }
        validate_task_id(target)?;
        Ok(WatchTarget::TaskId(target.to_string()))
    }

    /// 得到要轮询的任务ID。结果页优先取页面里的 `#task-id`，
    /// 没有时退回到地址中的 `/results/{task_id}`
    pub async fn resolve(&self, client: &HttpStatusClient) -> Result<String, MonitorError> {
        match self {
            WatchTarget::TaskId(id) => Ok(id.clone()),
            WatchTarget::ResultsPage(url) => {
                let html = client.fetch_page(url).await?;
                let task_id = extract_task_id(&html)
                    .or_else(|| task_id_from_results_url(url))
                    .ok_or_else(|| MonitorError::InvalidTaskId(format!("结果页中没有任务ID: {}", url)))?;
                validate_task_id(&task_id)?;
                log::info!("从结果页得到任务ID: {}", task_id);
                Ok(task_id)
            }
        }
    }
}

impl Command {
    pub fn scrape_form(&self) -> Option<ScrapeForm> {
        match self {
            Command::Submit { url, depth, assets } => Some(ScrapeForm::new(url.clone(), *depth, *assets)),
            Command::Watch { .. } => None,
        }
    }
}

impl Args {
    /// 解析命令行参数并加载配置
    pub fn parse_args() -> Result<(Self, Config), MonitorError> {
        let args = Args::parse();

        if args.edit_config {
            if !Path::new(&args.config).exists() {
                Config::default().save_with_tutorial(&args.config)?;
            }
            open_config_in_editor(&args.config);
            std::process::exit(0);
        }

        let config = args.load_config()?;
        Ok((args, config))
    }

    /// 读取（或创建）配置文件，合并命令行参数并校验
    pub fn load_config(&self) -> Result<Config, MonitorError> {
        let mut config = Config::load(&self.config)?;
        config.merge_from_args(self);
        config.validate()?;
        Ok(config)
    }

    pub fn command(&self) -> Result<&Command, MonitorError> {
        self.command
            .as_ref()
            .ok_or_else(|| MonitorError::Unknown("缺少子命令，使用 --help 查看用法".to_string()))
    }
}
