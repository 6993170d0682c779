use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::infrastructure::llm::{InferenceConfig, DEFAULT_HOST, DEFAULT_MODEL};

#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Supportive chat front-end backed by a local Ollama server"
)]
pub struct AppConfig {
    /// HTTP 监听地址
    #[arg(long, env = "SOLACE_BIND", default_value = "0.0.0.0:3000")]
    pub bind: String,

    // 推理服务配置
    /// Ollama 服务地址
    #[arg(long, env = "OLLAMA_HOST", default_value = DEFAULT_HOST)]
    pub inference_host: String,

    #[arg(long, env = "OLLAMA_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// 单次聊天的最大尝试次数
    #[arg(long, env = "MAX_RETRIES", default_value_t = 3)]
    pub max_retries: u32,

    /// 两次尝试之间的等待时间（毫秒）
    #[arg(long, env = "RETRY_DELAY_MS", default_value_t = 2000)]
    pub retry_delay_ms: u64,

    /// 单次请求超时（秒），不设置则不限制
    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    // 存储配置
    /// 聊天日志数据库文件
    #[arg(long, env = "CHAT_LOG_DB", default_value = "chat_logs.db")]
    pub db_path: PathBuf,

    /// 静态资源目录
    #[arg(long, env = "PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,
}

impl AppConfig {
    /// 验证启动必需的配置
    ///
    /// 推理服务配置不在此处检查：客户端构建失败时服务降级运行，
    /// 聊天接口返回不可用提示
    pub fn validate(&self) -> anyhow::Result<()> {
        self.bind_addr()?;
        Ok(())
    }

    /// 解析监听地址
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid bind address {}: {}", self.bind, e))
    }

    /// 推理客户端配置
    pub fn inference(&self) -> InferenceConfig {
        InferenceConfig {
            host: self.inference_host.clone(),
            model: self.model.clone(),
            max_retries: self.max_retries,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
        }
    }
}
