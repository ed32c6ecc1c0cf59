//! Process-wide registry of live sessions.
//!
//! Maps a user to the set of their currently connected sessions (a user may
//! hold several at once across devices). Built on `DashMap`; entries are
//! added after a successful handshake and removed on disconnect, and a user
//! with zero sessions has no entry at all.
//!
//! The registry owns only outbound frame senders, never the WebSocket
//! transports, so cleanup can never close a transport twice. Lookups return
//! cloned handles: no map guard is ever held while writing to a transport.

use dashmap::DashMap;
use tokio::sync::mpsc;
use uuid::Uuid;

use platewire_types::frame::ServerFrame;
use platewire_types::user::UserId;

/// Cheap, cloneable reference to one live session's outbound queue.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: Uuid,
    outbound: mpsc::UnboundedSender<ServerFrame>,
}

impl SessionHandle {
    pub fn new(session_id: Uuid, outbound: mpsc::UnboundedSender<ServerFrame>) -> Self {
        Self {
            session_id,
            outbound,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Queue a frame for this session. Fails only when the connection task
    /// has already dropped its receiver.
    pub fn send(&self, frame: ServerFrame) -> Result<(), ()> {
        self.outbound.send(frame).map_err(|_| ())
    }
}

/// Thread-safe user -> live sessions table.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<UserId, Vec<SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session for a user.
    pub fn register(&self, user: &UserId, handle: SessionHandle) {
        self.sessions
            .entry(user.clone())
            .or_default()
            .push(handle);
        tracing::debug!(user = %user, "session registered");
    }

    /// Remove a session for a user, dropping the user's entry entirely when
    /// it was their last one. Unknown sessions are a no-op.
    pub fn unregister(&self, user: &UserId, session_id: Uuid) {
        if let Some(mut entry) = self.sessions.get_mut(user) {
            entry.retain(|h| h.session_id != session_id);
            let empty = entry.is_empty();
            drop(entry);
            if empty {
                self.sessions.remove_if(user, |_, handles| handles.is_empty());
            }
        }
        tracing::debug!(user = %user, "session unregistered");
    }

    /// Snapshot of the user's live sessions. The returned handles are clones;
    /// callers do their sends without touching the map.
    pub fn live_sessions_for(&self, user: &UserId) -> Vec<SessionHandle> {
        self.sessions
            .get(user)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Number of users with at least one live session.
    pub fn connected_users(&self) -> usize {
        self.sessions.len()
    }
}
