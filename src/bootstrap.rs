//! # Bootstrap
//!
//! 按配置组装推理客户端、日志存储和 Web 服务并启动

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::infrastructure::llm::OllamaClient;
use crate::infrastructure::store::SqliteLogStore;
use crate::infrastructure::web::{start_web_server, AppState};

/// 启动时查询模型列表的超时
pub const MODEL_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// 服务启动器
pub struct Launcher {
    config: AppConfig,
    model_check_timeout: Duration,
}

impl Launcher {
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            model_check_timeout: MODEL_CHECK_TIMEOUT,
        }
    }

    /// 设置启动时查询模型列表的超时
    pub fn with_model_check_timeout(mut self, timeout: Duration) -> Self {
        self.model_check_timeout = timeout;
        self
    }

    /// 启动服务，直到收到退出信号
    pub async fn launch(&self) -> Result<()> {
        info!("Launching solace v{}", crate::VERSION);

        let bind_addr = self.config.bind_addr()?;
        let state = self.build_state().await;
        start_web_server(bind_addr, state, &self.config.public_dir).await
    }

    /// 组装 Web 服务状态
    ///
    /// 推理客户端初始化失败不会中断启动
    pub async fn build_state(&self) -> Arc<AppState> {
        let llm = self.initialize_inference_client().await;
        let store = Arc::new(SqliteLogStore::new(&self.config.db_path));
        info!("Chat logs will be written to {}", store.db_path().display());

        Arc::new(AppState::new(llm, store))
    }

    /// 初始化推理客户端
    ///
    /// 失败时返回 `None`，服务照常启动，聊天接口返回不可用提示
    pub async fn initialize_inference_client(&self) -> Option<OllamaClient> {
        let client = match OllamaClient::new(self.config.inference()) {
            Ok(client) => client,
            Err(e) => {
                error!("Error initializing OllamaClient: {}", e);
                return None;
            }
        };

        match tokio::time::timeout(self.model_check_timeout, client.probe()).await {
            Ok(Ok(models)) if models.iter().any(|m| m == client.model()) => {
                info!("Model {} is available", client.model());
            }
            Ok(Ok(models)) => {
                warn!(
                    "Model {} not listed by inference server (available: {})",
                    client.model(),
                    models.join(", ")
                );
            }
            Ok(Err(e)) => warn!("Inference server not reachable yet: {}", e),
            Err(_) => warn!(
                "Inference server did not answer within {:?}",
                self.model_check_timeout
            ),
        }

        Some(client)
    }
}
