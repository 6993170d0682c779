//! Solace
//!
//! 轻量的情绪支持聊天前端：
//! - 提供几个静态页面
//! - 将聊天消息转发给本地 Ollama 推理服务（有限次重试、容错解析）
//! - 把每次成功的对话追加写入 SQLite 日志表
//!
//! # 架构分层
//!
//! - `domain`: 领域实体
//! - `core`: 存储抽象
//! - `infrastructure`: 推理客户端、SQLite、Web 服务器、日志

// 领域层
pub mod domain;

// 核心层
pub mod core;

// 基础设施层
pub mod infrastructure;

pub mod bootstrap;
pub mod config;
pub mod errors;

pub use bootstrap::Launcher;
pub use config::AppConfig;
pub use crate::core::store::{LogStore, MemoryLogStore};
pub use domain::{ChatLogEntry, NewChatLog};
pub use errors::{Result, SolaceError};
pub use infrastructure::llm::{parse_possibly_concatenated_json, InferenceConfig, OllamaClient};
pub use infrastructure::logger;
pub use infrastructure::store::SqliteLogStore;
pub use infrastructure::web::{create_router, start_web_server, AppState};

/// 版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
