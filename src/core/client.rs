//! 与抓取服务通信的 HTTP 客户端
//!
//! - `GET  /status/{task_id}` 任务状态
//! - `GET  /results/{task_id}` 结果页（HTML）
//! - `POST /scrape` 提交抓取表单，服务端以重定向返回结果页地址

use std::time::Duration;
use async_trait::async_trait;
use awc::http::header;
use url::Url;

use crate::config::Config;
use crate::core::error::{MonitorError, MonitorResult};
use crate::core::status::TaskStatus;
use crate::utils::validator::{validate_task_id, ScrapeForm};

/// 状态来源，每次调用只发出一次请求
#[async_trait(?Send)]
pub trait StatusSource {
    async fn fetch_status(&self, task_id: &str) -> MonitorResult<TaskStatus>;
}

pub struct HttpStatusClient {
    client: awc::Client,
    base: Url,
}

/// 服务根地址统一以 `/` 结尾，便于拼接相对路径
pub fn parse_base_url(server_url: &str) -> MonitorResult<Url> {
    let mut base = Url::parse(server_url)?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(MonitorError::InvalidUrl(server_url.to_string()));
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// 从 `/results/{task_id}` 形式的地址中取出任务ID
pub fn task_id_from_results_url(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    segments
        .windows(2)
        .rev()
        .find(|pair| pair[0] == "results" && !pair[1].is_empty())
        .map(|pair| pair[1].to_string())
}

impl HttpStatusClient {
    pub fn new(config: &Config) -> MonitorResult<Self> {
        let base = parse_base_url(&config.server_url)?;
        let builder = awc::Client::builder()
            .add_default_header((header::USER_AGENT, config.user_agent.clone()))
            .disable_redirects();
        // 默认不设超时，挂起的请求会一直等待
        let builder = if config.request_timeout_secs > 0 {
            builder.timeout(Duration::from_secs(config.request_timeout_secs))
        } else {
            builder.disable_timeout()
        };
        Ok(Self { client: builder.finish(), base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn status_url(&self, task_id: &str) -> MonitorResult<Url> {
        validate_task_id(task_id)?;
        Ok(self.base.join(&format!("status/{}", task_id))?)
    }

    pub fn results_url(&self, task_id: &str) -> MonitorResult<Url> {
        validate_task_id(task_id)?;
        Ok(self.base.join(&format!("results/{}", task_id))?)
    }

    /// 获取页面 HTML
    pub async fn fetch_page(&self, url: &Url) -> MonitorResult<String> {
        let mut response = self.client.get(url.as_str()).send().await
            .map_err(|e| MonitorError::NetworkError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(MonitorError::HttpStatus(response.status().as_u16()));
        }
        let body = response.body().await
            .map_err(|e| MonitorError::NetworkError(e.to_string()))?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// 提交抓取表单，成功时返回新任务ID
    pub async fn submit(&self, form: &ScrapeForm) -> MonitorResult<String> {
        form.validate()?;
        let url = self.base.join("scrape")?;
        log::info!("提交抓取任务: {} (深度 {})", form.url, form.max_depth);

        let response = self.client.post(url.as_str()).send_form(&form.fields()).await
            .map_err(|e| MonitorError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_redirection() {
            return Err(MonitorError::SubmitRejected(format!("HTTP {}", status.as_u16())));
        }
        let location = response.headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| MonitorError::SubmitRejected("响应缺少跳转地址".to_string()))?;
        let target = self.base.join(location)?;

        // 校验失败时服务端会跳回首页
        task_id_from_results_url(&target)
            .ok_or_else(|| MonitorError::SubmitRejected(format!("服务端跳转到了 {}", target.path())))
    }
}

#[async_trait(?Send)]
impl StatusSource for HttpStatusClient {
    async fn fetch_status(&self, task_id: &str) -> MonitorResult<TaskStatus> {
        let url = self.status_url(task_id)?;
        log::debug!("GET {}", url);

        let mut response = self.client.get(url.as_str()).send().await
            .map_err(|e| MonitorError::NetworkError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(MonitorError::HttpStatus(response.status().as_u16()));
        }
        let body = response.body().await
            .map_err(|e| MonitorError::NetworkError(e.to_string()))?;
        Ok(serde_json::from_slice(&body)?)
    }
}
