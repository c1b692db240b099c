use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("网络错误: {0}")]
    NetworkError(String),

    #[error("服务器返回异常状态: {0}")]
    HttpStatus(u16),

    #[error("状态数据无法解析: {0}")]
    InvalidPayload(String),

    #[error("IO错误: {0}")]
    IoError(#[from] io::Error),

    #[error("无效的任务ID: {0:?}")]
    InvalidTaskId(String),

    #[error("无效的URL: {0}")]
    InvalidUrl(String),

    #[error("表单校验失败: {0}")]
    InvalidForm(String),

    #[error("抓取请求被服务器拒绝: {0}")]
    SubmitRejected(String),

    #[error("配置错误: {0}")]
    ConfigError(String),

    #[error("未知错误: {0}")]
    Unknown(String),
}

impl MonitorError {
    /// 本轮获取失败（网络、HTTP状态或数据格式），轮询到此为止
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            MonitorError::NetworkError(_) |
            MonitorError::HttpStatus(_) |
            MonitorError::InvalidPayload(_)
        )
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(error: serde_json::Error) -> Self {
        MonitorError::InvalidPayload(error.to_string())
    }
}

impl From<url::ParseError> for MonitorError {
    fn from(error: url::ParseError) -> Self {
        MonitorError::InvalidUrl(error.to_string())
    }
}

impl From<String> for MonitorError {
    fn from(error: String) -> Self {
        MonitorError::Unknown(error)
    }
}

impl From<&str> for MonitorError {
    fn from(error: &str) -> Self {
        MonitorError::Unknown(error.to_string())
    }
}


pub type MonitorResult<T> = Result<T, MonitorError>;
