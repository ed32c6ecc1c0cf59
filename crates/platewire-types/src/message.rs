//! Persisted message record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::conversation::ConversationKey;
use crate::user::UserId;

/// A message persisted in a conversation's append-only log.
///
/// Fully formed only by the message store: `id`, `seq`, and `created_at`
/// are assigned at persistence time. Within a conversation, records are
/// totally ordered by `(seq, id)` and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// UUIDv7 message ID (time-sortable, used by clients to reconcile
    /// optimistic renders against fan-out echoes).
    pub id: Uuid,
    /// Conversation partition this message belongs to.
    pub conversation_key: ConversationKey,
    /// Sequence number scoped to the conversation, starting at 1.
    pub seq: i64,
    /// Sender.
    pub from_user: UserId,
    /// Message body text.
    pub body: String,
    /// Persistence-time timestamp, authoritative for ordering display.
    pub created_at: DateTime<Utc>,
}
