//! SQLite 存储实现
//!
//! 每次操作打开一个新连接，确保表存在后执行，结束即关闭。
//! 并发写入由 SQLite 自身串行化，进程内不持有共享连接。

use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use rusqlite::Connection;

use crate::core::store::LogStore;
use crate::domain::{now_timestamp, ChatLogEntry, NewChatLog};
use crate::errors::{Result, SolaceError};

const CREATE_CHAT_LOGS: &str = "
    CREATE TABLE IF NOT EXISTS chat_logs (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp TEXT,
        user_message TEXT,
        ai_response TEXT
    );
";

/// SQLite 聊天日志存储
#[derive(Debug, Clone)]
pub struct SqliteLogStore {
    db_path: PathBuf,
}

impl SqliteLogStore {
    /// 创建存储
    ///
    /// 数据库文件在第一次写入时创建
    pub fn new<P: AsRef<Path>>(db_path: P) -> Self {
        Self {
            db_path: db_path.as_ref().to_path_buf(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// 在阻塞线程池中打开连接并执行数据库操作
    async fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let db_path = self.db_path.clone();
        tokio::task::spawn_blocking(move || -> anyhow::Result<T> {
            let conn = Connection::open(&db_path)
                .with_context(|| format!("failed to open {}", db_path.display()))?;
            conn.execute_batch(CREATE_CHAT_LOGS)
                .context("failed to ensure chat_logs table")?;

            let result = f(&conn)?;

            conn.close()
                .map_err(|(_, e)| e)
                .context("failed to close database connection")?;
            Ok(result)
        })
        .await
        .map_err(|e| SolaceError::StorageError(format!("Task failed: {}", e)))?
        .map_err(SolaceError::from)
    }
}

#[async_trait]
impl LogStore for SqliteLogStore {
    async fn append(&self, log: NewChatLog) -> Result<ChatLogEntry> {
        self.execute(move |conn| {
            let timestamp = now_timestamp();
            conn.execute(
                "INSERT INTO chat_logs (timestamp, user_message, ai_response)
                 VALUES (?1, ?2, ?3)",
                rusqlite::params![&timestamp, &log.user_message, &log.ai_response],
            )?;

            Ok(ChatLogEntry {
                id: conn.last_insert_rowid(),
                timestamp,
                user_message: log.user_message,
                ai_response: log.ai_response,
            })
        })
        .await
    }

    async fn recent(&self, limit: usize) -> Result<Vec<ChatLogEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, user_message, ai_response
                 FROM chat_logs
                 ORDER BY id DESC
                 LIMIT ?1",
            )?;

            let rows = stmt.query_map([limit], |row| {
                Ok(ChatLogEntry {
                    id: row.get(0)?,
                    timestamp: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                    user_message: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    ai_response: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                })
            })?;

            let mut entries = Vec::new();
            for row in rows {
                entries.push(row?);
            }
            Ok(entries)
        })
        .await
    }
}
