//! Message store trait definition.
//!
//! The store is the single source of truth and the single point of sequence
//! assignment for the whole subsystem. Uses native async fn in traits
//! (Rust 2024 edition, no async_trait macro).

use platewire_types::conversation::ConversationKey;
use platewire_types::error::StoreError;
use platewire_types::message::ChatMessage;
use platewire_types::user::UserId;

/// Append-only, per-conversation ordered message log.
pub trait MessageStore: Send + Sync {
    /// Persist a new message, assigning the next sequence number for the
    /// conversation atomically with respect to concurrent appends to the
    /// same key. Returns the fully formed record (id, seq, timestamp).
    ///
    /// Callers must not fan out a message whose append failed.
    fn append(
        &self,
        key: &ConversationKey,
        from: &UserId,
        body: &str,
    ) -> impl std::future::Future<Output = Result<ChatMessage, StoreError>> + Send;

    /// The most recent `limit` messages in ascending order, oldest first,
    /// ready for direct replay. An empty conversation yields an empty vec,
    /// not an error.
    fn recent(
        &self,
        key: &ConversationKey,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<ChatMessage>, StoreError>> + Send;
}
