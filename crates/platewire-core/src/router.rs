//! Message router: validate, persist, then fan out.
//!
//! Persistence strictly precedes delivery. A message that failed to append
//! is reported to the originating session only and reaches nobody else; a
//! persisted message is delivered best-effort to every live session of both
//! participants, the sender's own sessions included.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use platewire_types::conversation::ConversationKey;
use platewire_types::error::StoreError;
use platewire_types::frame::{ClientFrame, ErrorCode, ServerFrame};
use platewire_types::message::ChatMessage;
use platewire_types::user::UserId;

use crate::registry::SessionRegistry;
use crate::repository::message::MessageStore;
use crate::session::LiveSession;

/// Routes inbound frames from live connections.
pub struct MessageRouter<S> {
    store: Arc<S>,
    registry: Arc<SessionRegistry>,
    /// Per-conversation ordering locks, held across append + fan-out so
    /// every live recipient observes messages in persisted sequence order.
    /// The store alone serializes sequence assignment, but without this a
    /// second sender's fan-out could overtake the first's. Channel sends
    /// under the lock are non-blocking queue pushes, not network I/O.
    ordering: DashMap<ConversationKey, Arc<Mutex<()>>>,
}

impl<S: MessageStore> MessageRouter<S> {
    pub fn new(store: Arc<S>, registry: Arc<SessionRegistry>) -> Self {
        Self {
            store,
            registry,
            ordering: DashMap::new(),
        }
    }

    /// Handle one raw text frame from a live session.
    ///
    /// Malformed frames and append failures produce an inline error frame to
    /// the originating session; neither tears down the connection.
    pub async fn handle_inbound(&self, session: &LiveSession, raw: &str) {
        let frame = match ClientFrame::parse(raw) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::debug!(user = %session.user_id, error = %err, "rejecting malformed frame");
                session.send(ServerFrame::error(ErrorCode::MalformedFrame, err.to_string()));
                return;
            }
        };

        // Clone the Arc out so the map guard drops before the await.
        let lock = self
            .ordering
            .entry(session.key.clone())
            .or_default()
            .clone();
        {
            let _ordered = lock.lock().await;

            match self
                .store
                .append(&session.key, &session.user_id, &frame.message)
                .await
            {
                Ok(persisted) => {
                    tracing::debug!(
                        key = %session.key,
                        seq = persisted.seq,
                        id = %persisted.id,
                        "message persisted"
                    );
                    self.fan_out(session, &persisted);
                }
                Err(err) => {
                    tracing::warn!(
                        key = %session.key,
                        user = %session.user_id,
                        error = %err,
                        "message append failed, not fanning out"
                    );
                    session.send(storage_error_frame(&err));
                }
            }
        }
        drop(lock);

        // Evict the entry once the map holds the only reference; idle
        // conversations must not pin lock entries for the process lifetime.
        // A racing sender that cloned first keeps the count above one and
        // the entry stays.
        self.ordering
            .remove_if(&session.key, |_, lock| Arc::strong_count(lock) == 1);
    }

    /// Deliver a persisted message to every live session of both
    /// participants. When sender and peer are the same user, the participant
    /// set collapses to one so each session gets exactly one copy.
    fn fan_out(&self, session: &LiveSession, msg: &ChatMessage) {
        let frame = ServerFrame::live(msg);
        self.deliver_to(&session.user_id, &frame);
        if session.peer_id != session.user_id {
            self.deliver_to(&session.peer_id, &frame);
        }
    }

    /// Best-effort delivery to all of one user's sessions. A handle whose
    /// connection task is gone is unregistered and skipped; the recipient
    /// catches up via history replay on reconnect.
    fn deliver_to(&self, user: &UserId, frame: &ServerFrame) {
        for handle in self.registry.live_sessions_for(user) {
            if handle.send(frame.clone()).is_err() {
                tracing::debug!(
                    user = %user,
                    session = %handle.session_id(),
                    "dropping delivery to dead session"
                );
                self.registry.unregister(user, handle.session_id());
            }
        }
    }
}

fn storage_error_frame(err: &StoreError) -> ServerFrame {
    ServerFrame::error(ErrorCode::StorageUnavailable, err.to_string())
}
