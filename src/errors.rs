//! 标准化错误处理
//!
//! 定义项目专用的错误类型

use thiserror::Error;

use crate::infrastructure::llm::ParseError;

/// 项目主要错误类型
#[derive(Error, Debug)]
pub enum SolaceError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 网络请求错误
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 推理服务返回非 2xx 状态码
    #[error("HTTP error! status: {0}")]
    HttpStatus(u16),

    /// 响应体无法解析为 JSON
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] ParseError),

    /// 所有重试均失败
    #[error("Failed to connect to inference server after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },

    /// 存储相关错误
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl SolaceError {
    /// 单次尝试失败后是否值得重试
    ///
    /// 配置错误在每次尝试中都会复现，重试没有意义
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SolaceError::NetworkError(_) | SolaceError::HttpStatus(_) | SolaceError::ParseError(_)
        )
    }
}

impl From<reqwest::Error> for SolaceError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => SolaceError::HttpStatus(status.as_u16()),
            None => SolaceError::NetworkError(err.to_string()),
        }
    }
}

impl From<anyhow::Error> for SolaceError {
    fn from(err: anyhow::Error) -> Self {
        SolaceError::StorageError(format!("{:#}", err))
    }
}

impl From<url::ParseError> for SolaceError {
    fn from(err: url::ParseError) -> Self {
        SolaceError::ConfigError(err.to_string())
    }
}

/// 项目结果类型别名
pub type Result<T> = std::result::Result<T, SolaceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exhaustion_message() {
        let err = SolaceError::RetriesExhausted { attempts: 3 };
        assert_eq!(
            err.to_string(),
            "Failed to connect to inference server after 3 attempts"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(SolaceError::HttpStatus(500).is_retryable());
        assert!(SolaceError::NetworkError("refused".to_string()).is_retryable());
        assert!(!SolaceError::ConfigError("bad".to_string()).is_retryable());
        assert!(!SolaceError::RetriesExhausted { attempts: 3 }.is_retryable());
    }
}
