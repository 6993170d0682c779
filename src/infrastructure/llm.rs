//! 推理服务客户端
//!
//! 通过 HTTP 调用本地 Ollama 服务的 `/api/chat` 接口，带有限次重试，
//! 并容忍上游返回的拼接 JSON / 分行 JSON 响应体

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::errors::{Result, SolaceError};

/// 默认推理服务地址
pub const DEFAULT_HOST: &str = "http://localhost:11434";

/// 默认模型
pub const DEFAULT_MODEL: &str = "llama3.2:3b";

/// 固定系统提示词
pub const SYSTEM_PROMPT: &str =
    "You are a supportive AI assistant focused on mental health and well-being.";

/// 响应可解析但缺少 `message.content` 时返回给用户的文本
pub const UNEXPECTED_FORMAT_REPLY: &str =
    "I'm sorry, I received an unexpected response format. Please try again.";

/// 推理客户端配置
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    pub host: String,
    pub model: String,
    /// 最大尝试次数（包含第一次）
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub request_timeout: Option<Duration>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_retries: 3,
            retry_delay: Duration::from_secs(2),
            request_timeout: None,
        }
    }
}

/// 响应体无法以任何方式解析为 JSON
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{0}")]
pub struct ParseError(String);

/// 解析可能由多个 JSON 对象拼接而成的响应体
///
/// 依次尝试：
/// 1. 整体解析
/// 2. 在第一个 `}{` 边界处截断，只解析第一个对象
/// 3. 按换行切分，只解析第一行
///
/// 全部失败时返回整体解析的错误信息。
pub fn parse_possibly_concatenated_json(raw: &str) -> std::result::Result<Value, ParseError> {
    let whole_err = match serde_json::from_str::<Value>(raw) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    if let Some(pos) = raw.find("}{").filter(|&pos| pos > 0) {
        if let Ok(value) = serde_json::from_str::<Value>(&raw[..=pos]) {
            info!("Found multiple JSON objects, using only the first one");
            return Ok(value);
        }
    }

    if let Some(first_line) = raw.split('\n').next() {
        if let Ok(value) = serde_json::from_str::<Value>(first_line) {
            info!("Successfully parsed first line of response");
            return Ok(value);
        }
    }

    Err(ParseError(whole_err.to_string()))
}

/// 提取 `message.content`，空字符串视为缺失
fn extract_content(value: &Value) -> Option<&str> {
    value
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

/// Ollama 客户端
#[derive(Clone, Debug)]
pub struct OllamaClient {
    http: reqwest::Client,
    host: String,
    model: String,
    max_retries: u32,
    retry_delay: Duration,
}

impl OllamaClient {
    /// 创建新的客户端
    ///
    /// 地址不是 http(s) URL、`max_retries` 为 0 或 HTTP 客户端构建失败时返回错误
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let host = config.host.trim_end_matches('/').to_string();
        let parsed = url::Url::parse(&host)?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SolaceError::ConfigError(format!(
                "unsupported inference host scheme: {}",
                parsed.scheme()
            )));
        }
        if config.max_retries == 0 {
            return Err(SolaceError::ConfigError(
                "max_retries must be at least 1".to_string(),
            ));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| SolaceError::ConfigError(format!("failed to build HTTP client: {}", e)))?;

        info!("Initialized OllamaClient with model: {}", config.model);

        Ok(Self {
            http,
            host,
            model: config.model,
            max_retries: config.max_retries,
            retry_delay: config.retry_delay,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// 发送单轮对话，返回模型回复
    ///
    /// 传输错误、非 2xx 状态和无法解析的响应体会触发重试，
    /// 尝试次数用尽后返回 [`SolaceError::RetriesExhausted`]
    pub async fn chat(&self, user_input: &str) -> Result<String> {
        for attempt in 1..=self.max_retries {
            info!("Attempt {}: sending request to {}...", attempt, self.host);

            let err = match self.attempt(user_input).await {
                Ok(reply) => return Ok(reply),
                Err(e) => e,
            };

            error!(
                "Error connecting to inference server (attempt {}/{}): {}",
                attempt, self.max_retries, err
            );
            if !err.is_retryable() {
                return Err(err);
            }
            if attempt < self.max_retries {
                tokio::time::sleep(self.retry_delay).await;
            }
        }

        Err(SolaceError::RetriesExhausted {
            attempts: self.max_retries,
        })
    }

    async fn attempt(&self, user_input: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: user_input,
                },
            ],
            stream: false,
        };

        let response = self
            .http
            .post(format!("{}/api/chat", self.host))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SolaceError::HttpStatus(status.as_u16()));
        }

        let raw = response.text().await?;
        let data = parse_possibly_concatenated_json(&raw)?;

        match extract_content(&data) {
            Some(content) => Ok(content.to_string()),
            None => {
                warn!("Unexpected response structure: {}", data);
                Ok(UNEXPECTED_FORMAT_REPLY.to_string())
            }
        }
    }

    /// 查询推理服务已加载的模型列表
    pub async fn probe(&self) -> Result<Vec<String>> {
        let tags: TagsResponse = self
            .http
            .get(format!("{}/api/tags", self.host))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}
