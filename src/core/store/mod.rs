//! 存储接口定义
//!
//! 聊天日志的持久化抽象，支持内存和 SQLite 实现

use async_trait::async_trait;

use crate::domain::{ChatLogEntry, NewChatLog};
use crate::errors::Result;

pub mod memory;

pub use memory::MemoryLogStore;

/// `recent` 默认返回条数
pub const DEFAULT_RECENT_LIMIT: usize = 50;

/// `recent` 单次最多返回条数
pub const MAX_RECENT_LIMIT: usize = 500;

/// 聊天日志存储接口
///
/// 只追加：不提供更新和删除，id 按写入顺序严格递增
#[async_trait]
pub trait LogStore: Send + Sync {
    /// 追加一条日志，返回带 id 和时间戳的完整记录
    async fn append(&self, log: NewChatLog) -> Result<ChatLogEntry>;

    /// 按 id 倒序返回最近的日志
    async fn recent(&self, limit: usize) -> Result<Vec<ChatLogEntry>>;
}
