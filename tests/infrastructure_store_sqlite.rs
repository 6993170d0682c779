//! SQLite 存储实现测试

use rusqlite::Connection;
use solace::{LogStore, NewChatLog, SqliteLogStore};

#[tokio::test]
async fn test_ids_strictly_increase() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteLogStore::new(dir.path().join("chat_logs.db"));

    let mut last_id = 0;
    for i in 0..5 {
        let entry = store
            .append(NewChatLog::new(format!("message {}", i), format!("reply {}", i)))
            .await
            .unwrap();
        assert!(entry.id > last_id);
        last_id = entry.id;
    }
}

#[tokio::test]
async fn test_rows_survive_new_store_instance() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat_logs.db");

    let first = SqliteLogStore::new(&path)
        .append(NewChatLog::new("hello", "hi"))
        .await
        .unwrap();

    let reopened = SqliteLogStore::new(&path);
    let second = reopened
        .append(NewChatLog::new("still there?", "yes"))
        .await
        .unwrap();
    assert!(second.id > first.id);

    let logs = reopened.recent(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].user_message, "still there?");
    assert_eq!(logs[1].ai_response, "hi");
}

#[tokio::test]
async fn test_recent_respects_limit() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteLogStore::new(dir.path().join("chat_logs.db"));

    for i in 0..4 {
        store
            .append(NewChatLog::new(format!("q{}", i), format!("a{}", i)))
            .await
            .unwrap();
    }

    let logs = store.recent(2).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].user_message, "q3");
    assert_eq!(logs[1].user_message, "q2");
}

#[tokio::test]
async fn test_recent_on_fresh_database_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteLogStore::new(dir.path().join("chat_logs.db"));

    assert!(store.recent(10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_existing_table_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("chat_logs.db");

    {
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE chat_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT,
                user_message TEXT,
                ai_response TEXT
            );
            INSERT INTO chat_logs (timestamp, user_message, ai_response)
            VALUES ('2024-01-01 00:00:00', 'legacy', 'row');",
        )
        .unwrap();
    }

    let store = SqliteLogStore::new(&path);
    let entry = store.append(NewChatLog::new("new", "row")).await.unwrap();
    assert_eq!(entry.id, 2);

    let logs = store.recent(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[1].timestamp, "2024-01-01 00:00:00");
}

#[tokio::test]
async fn test_timestamp_format() {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteLogStore::new(dir.path().join("chat_logs.db"));

    let entry = store.append(NewChatLog::new("hi", "hello")).await.unwrap();

    // YYYY-MM-DD HH:MM:SS
    assert_eq!(entry.timestamp.len(), 19);
    assert_eq!(&entry.timestamp[4..5], "-");
    assert_eq!(&entry.timestamp[10..11], " ");
}
