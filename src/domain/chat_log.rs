//! 聊天日志领域实体
//!
//! 每次成功的对话交换对应一条只追加的日志记录

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 日志时间戳格式（秒精度）
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// 已持久化的聊天日志
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatLogEntry {
    pub id: i64,
    pub timestamp: String,
    pub user_message: String,
    pub ai_response: String,
}

/// 待写入的聊天日志，时间戳由存储在写入时生成
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatLog {
    pub user_message: String,
    pub ai_response: String,
}

impl NewChatLog {
    pub fn new(user_message: impl Into<String>, ai_response: impl Into<String>) -> Self {
        Self {
            user_message: user_message.into(),
            ai_response: ai_response.into(),
        }
    }
}

/// 按日志格式输出时间戳
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// 当前时间的日志时间戳
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}
