//! History replay: the one-time backlog sent to a freshly connected session.

use std::sync::Arc;

use platewire_types::conversation::ConversationKey;
use platewire_types::error::StoreError;
use platewire_types::frame::ServerFrame;

use crate::repository::message::MessageStore;

/// Builds the backlog frame for new connections.
///
/// Ordering contract with the connection handler: the session is registered
/// in the [`SessionRegistry`](crate::registry::SessionRegistry) *before*
/// `backlog` is called, so any message fanned out during the fetch queues in
/// the session's channel and is flushed right after the history frame. A
/// message appended in that window may reach the client twice (backlog and
/// live); clients de-duplicate by message id. None can be lost.
pub struct HistoryReplayer<S> {
    store: Arc<S>,
    limit: u32,
}

impl<S: MessageStore> HistoryReplayer<S> {
    pub fn new(store: Arc<S>, limit: u32) -> Self {
        Self { store, limit }
    }

    /// Fetch the most recent window of the conversation and wrap it as a
    /// single history frame, oldest message first. An empty conversation
    /// yields `{"type":"history","messages":[]}`.
    pub async fn backlog(&self, key: &ConversationKey) -> Result<ServerFrame, StoreError> {
        let messages = self.store.recent(key, self.limit).await?;
        tracing::debug!(key = %key, count = messages.len(), "history backlog fetched");
        Ok(ServerFrame::history(messages))
    }
}
