//! 内存存储实现
//!
//! 数据仅在内存中，重启后丢失，适合测试

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{now_timestamp, ChatLogEntry, NewChatLog};
use crate::errors::Result;

use super::LogStore;

/// 内存日志存储
#[derive(Default)]
pub struct MemoryLogStore {
    entries: RwLock<Vec<ChatLogEntry>>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前日志数量
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl LogStore for MemoryLogStore {
    async fn append(&self, log: NewChatLog) -> Result<ChatLogEntry> {
        let mut entries = self.entries.write().await;
        let id = entries.last().map_or(1, |e| e.id + 1);
        let entry = ChatLogEntry {
            id,
            timestamp: now_timestamp(),
            user_message: log.user_message,
            ai_response: log.ai_response,
        };
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatLogEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.iter().rev().take(limit).cloned().collect())
    }
}
