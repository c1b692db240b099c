use anyhow::Result;
use url::Url;
use crate::core::error::{MonitorError, MonitorResult};

pub const MIN_DEPTH: u32 = 1;
pub const MAX_DEPTH: u32 = 5;

pub fn is_valid_url(url: &str) -> bool {
    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https") && parsed.host_str().is_some(),
        Err(_) => false,
    }
}

/// 任务ID会拼进 URL 路径，不能为空也不能含路径分隔符
pub fn validate_task_id(task_id: &str) -> MonitorResult<()> {
    let trimmed = task_id.trim();
    if trimmed.is_empty() || trimmed.len() != task_id.len() {
        return Err(MonitorError::InvalidTaskId(task_id.to_string()));
    }
    if task_id.chars().any(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace()) {
        return Err(MonitorError::InvalidTaskId(task_id.to_string()));
    }
    Ok(())
}

pub fn validate_scrape_url(url: &str) -> Result<()> {
    if url.trim().is_empty() {
        anyhow::bail!("请输入要抓取的URL");
    }
    if !is_valid_url(url) {
        anyhow::bail!("URL必须是 http 或 https 地址: {}", url);
    }
    Ok(())
}

pub fn validate_depth(depth: u32) -> Result<()> {
    if !(MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
        anyhow::bail!("抓取深度必须在 {} 到 {} 之间", MIN_DEPTH, MAX_DEPTH);
    }
    Ok(())
}

/// 首页的抓取表单
#[derive(Debug, Clone, PartialEq)]
pub struct ScrapeForm {
    pub url: String,
    pub max_depth: u32,
    pub download_assets: bool,
}

impl Default for ScrapeForm {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_depth: MIN_DEPTH,
            download_assets: true,
        }
    }
}

impl ScrapeForm {
    pub fn new(url: impl Into<String>, max_depth: u32, download_assets: bool) -> Self {
        Self { url: url.into(), max_depth, download_assets }
    }

    /// 等价于页面上的约束校验，任一字段不合法都不允许提交
    pub fn validate(&self) -> MonitorResult<()> {
        validate_scrape_url(&self.url)
            .and_then(|_| validate_depth(self.max_depth))
            .map_err(|e| MonitorError::InvalidForm(e.to_string()))
    }

    /// 表单编码字段；未勾选的复选框不提交
    pub fn fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("url", self.url.clone()),
            ("max_depth", self.max_depth.to_string()),
        ];
        if self.download_assets {
            fields.push(("download_assets", "on".to_string()));
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_validation() {
        assert!(is_valid_url("https://example.com"));
        assert!(is_valid_url("http://example.com/path?q=1"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("invalid-url"));
    }

    #[test]
    fn test_task_id_validation() {
        assert!(validate_task_id("5b1e9a4c-0d7f-4a43-9c1e-2f8b6a2d3e10").is_ok());
        assert!(validate_task_id("abc").is_ok());
        assert!(validate_task_id("").is_err());
        assert!(validate_task_id(" abc").is_err());
        assert!(validate_task_id("../etc").is_err());
        assert!(validate_task_id("a b").is_err());
    }

    #[test]
    fn test_depth_validation() {
        tokio_test::assert_ok!(validate_depth(1));
        tokio_test::assert_ok!(validate_depth(5));
        tokio_test::assert_err!(validate_depth(0));
        tokio_test::assert_err!(validate_depth(6));
    }

    #[test]
    fn test_form_validation() {
        assert!(ScrapeForm::new("https://example.com", 2, false).validate().is_ok());
        assert!(matches!(ScrapeForm::default().validate(), Err(MonitorError::InvalidForm(_))));
        assert!(ScrapeForm::new("https://example.com", 9, true).validate().is_err());
    }

    #[test]
    fn test_form_fields() {
        let fields = ScrapeForm::new("https://example.com", 2, true).fields();
        assert_eq!(fields.len(), 3);
        assert_eq!(fields[2], ("download_assets", "on".to_string()));

        let fields = ScrapeForm::new("https://example.com", 2, false).fields();
        assert!(fields.iter().all(|(k, _)| *k != "download_assets"));
    }
}
