//! SQLite message store implementation.
//!
//! Implements `MessageStore` from `platewire-core` using sqlx with split
//! read/write pools. Sequence assignment happens inside the INSERT itself
//! (`COALESCE(MAX(seq), 0) + 1` scoped to the conversation key) on the
//! single-connection writer pool, so concurrent appends to one conversation
//! can never interleave. The `UNIQUE (conversation_key, seq)` constraint
//! backs that up at the schema level.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use platewire_core::repository::message::MessageStore;
use platewire_types::conversation::ConversationKey;
use platewire_types::error::StoreError;
use platewire_types::message::ChatMessage;
use platewire_types::user::UserId;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `MessageStore`.
pub struct SqliteMessageStore {
    pool: DatabasePool,
}

impl SqliteMessageStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct ChatMessageRow {
    id: String,
    conversation_key: String,
    seq: i64,
    from_user: String,
    body: String,
    created_at: String,
}

impl ChatMessageRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_key: row.try_get("conversation_key")?,
            seq: row.try_get("seq")?,
            from_user: row.try_get("from_user")?,
            body: row.try_get("body")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_message(self) -> Result<ChatMessage, StoreError> {
        Ok(ChatMessage {
            id: parse_uuid(&self.id)?,
            conversation_key: ConversationKey::from_raw(self.conversation_key),
            seq: self.seq,
            from_user: UserId::parse(&self.from_user)
                .map_err(|e| StoreError::Corrupt(format!("invalid from_user: {e}")))?,
            body: self.body,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    s.parse::<Uuid>()
        .map_err(|e| StoreError::Corrupt(format!("invalid UUID: {e}")))
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Corrupt(format!("invalid datetime: {e}")))
}

// ---------------------------------------------------------------------------
// MessageStore impl
// ---------------------------------------------------------------------------

impl MessageStore for SqliteMessageStore {
    async fn append(
        &self,
        key: &ConversationKey,
        from: &UserId,
        body: &str,
    ) -> Result<ChatMessage, StoreError> {
        let id = Uuid::now_v7();
        let created_at = Utc::now();

        let row = sqlx::query(
            r#"INSERT INTO chat_messages
               (id, conversation_key, seq, from_user, body, created_at)
               VALUES (?, ?,
                       (SELECT COALESCE(MAX(seq), 0) + 1
                          FROM chat_messages
                         WHERE conversation_key = ?),
                       ?, ?, ?)
               RETURNING seq"#,
        )
        .bind(id.to_string())
        .bind(key.as_str())
        .bind(key.as_str())
        .bind(from.as_str())
        .bind(body)
        .bind(created_at.to_rfc3339())
        .fetch_one(&self.pool.writer)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let seq: i64 = row
            .try_get("seq")
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;

        Ok(ChatMessage {
            id,
            conversation_key: key.clone(),
            seq,
            from_user: from.clone(),
            body: body.to_string(),
            created_at,
        })
    }

    async fn recent(
        &self,
        key: &ConversationKey,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, StoreError> {
        let rows = sqlx::query(
            r#"SELECT * FROM chat_messages
               WHERE conversation_key = ?
               ORDER BY seq DESC
               LIMIT ?"#,
        )
        .bind(key.as_str())
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut msgs = Vec::with_capacity(rows.len());
        for row in &rows {
            let r = ChatMessageRow::from_row(row).map_err(|e| StoreError::Query(e.to_string()))?;
            msgs.push(r.into_message()?);
        }
        // Fetched newest-first; replay wants oldest-first.
        msgs.reverse();
        Ok(msgs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // The TempDir must outlive the pool; callers hold it for the test body.
    async fn test_store() -> (SqliteMessageStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        let pool = DatabasePool::new(&url).await.unwrap();
        (SqliteMessageStore::new(pool), dir)
    }

    fn uid(s: &str) -> UserId {
        UserId::parse(s).unwrap()
    }

    fn key(a: &str, b: &str) -> ConversationKey {
        ConversationKey::for_pair(&uid(a), &uid(b))
    }

    #[tokio::test]
    async fn test_append_assigns_increasing_seq() {
        let (store, _dir) = test_store().await;
        let k = key("alice", "bob");
        let alice = uid("alice");

        let m1 = store.append(&k, &alice, "first").await.unwrap();
        let m2 = store.append(&k, &alice, "second").await.unwrap();
        let m3 = store.append(&k, &alice, "third").await.unwrap();

        assert_eq!(m1.seq, 1);
        assert_eq!(m2.seq, 2);
        assert_eq!(m3.seq, 3);
        assert_ne!(m1.id, m2.id);
    }

    #[tokio::test]
    async fn test_seq_scoped_per_conversation() {
        let (store, _dir) = test_store().await;
        let alice = uid("alice");

        let ab = store.append(&key("alice", "bob"), &alice, "hi bob").await.unwrap();
        let ac = store
            .append(&key("alice", "carol"), &alice, "hi carol")
            .await
            .unwrap();

        assert_eq!(ab.seq, 1);
        assert_eq!(ac.seq, 1);
    }

    #[tokio::test]
    async fn test_recent_ascending_oldest_first() {
        let (store, _dir) = test_store().await;
        let k = key("alice", "bob");
        let alice = uid("alice");

        for i in 1..=5 {
            store.append(&k, &alice, &format!("msg {i}")).await.unwrap();
        }

        let msgs = store.recent(&k, 10).await.unwrap();
        assert_eq!(msgs.len(), 5);
        let seqs: Vec<i64> = msgs.iter().map(|m| m.seq).collect();
        assert_eq!(seqs, vec![1, 2, 3, 4, 5]);
        assert_eq!(msgs[0].body, "msg 1");
    }

    #[tokio::test]
    async fn test_recent_honors_limit_keeps_newest() {
        let (store, _dir) = test_store().await;
        let k = key("alice", "bob");
        let alice = uid("alice");

        for i in 1..=5 {
            store.append(&k, &alice, &format!("msg {i}")).await.unwrap();
        }

        let msgs = store.recent(&k, 2).await.unwrap();
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0].body, "msg 4");
        assert_eq!(msgs[1].body, "msg 5");
    }

    #[tokio::test]
    async fn test_recent_empty_conversation() {
        let (store, _dir) = test_store().await;
        let msgs = store.recent(&key("alice", "bob"), 50).await.unwrap();
        assert!(msgs.is_empty());
    }

    #[tokio::test]
    async fn test_recent_isolated_between_conversations() {
        let (store, _dir) = test_store().await;
        let alice = uid("alice");

        store.append(&key("alice", "bob"), &alice, "for bob").await.unwrap();
        store
            .append(&key("alice", "carol"), &alice, "for carol")
            .await
            .unwrap();

        let msgs = store.recent(&key("alice", "bob"), 50).await.unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].body, "for bob");
    }

    #[tokio::test]
    async fn test_concurrent_appends_distinct_gapless_seqs() {
        let (store, _dir) = test_store().await;
        let store = Arc::new(store);
        let k = key("alice", "bob");

        let mut tasks = Vec::new();
        for i in 0..16 {
            let store = store.clone();
            let k = k.clone();
            let sender = if i % 2 == 0 { uid("alice") } else { uid("bob") };
            tasks.push(tokio::spawn(async move {
                store.append(&k, &sender, &format!("msg {i}")).await.unwrap().seq
            }));
        }

        let mut seqs = Vec::new();
        for task in tasks {
            seqs.push(task.await.unwrap());
        }
        seqs.sort_unstable();

        assert_eq!(seqs, (1..=16).collect::<Vec<i64>>());
    }

    #[tokio::test]
    async fn test_round_trip_preserves_fields() {
        let (store, _dir) = test_store().await;
        let k = key("alice", "bob");
        let alice = uid("alice");

        let written = store.append(&k, &alice, "best gyoza in town").await.unwrap();
        let read = store.recent(&k, 1).await.unwrap().remove(0);

        assert_eq!(read.id, written.id);
        assert_eq!(read.from_user, alice);
        assert_eq!(read.body, "best gyoza in town");
        assert_eq!(read.conversation_key, k);
        // RFC3339 round-trip may truncate sub-second precision.
        assert_eq!(
            read.created_at.timestamp(),
            written.created_at.timestamp()
        );
    }
}
