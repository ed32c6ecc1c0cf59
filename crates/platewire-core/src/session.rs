//! Per-connection state machine and live session context.

use tokio::sync::mpsc;
use uuid::Uuid;

use platewire_types::conversation::ConversationKey;
use platewire_types::frame::ServerFrame;
use platewire_types::user::UserId;

/// Lifecycle of one chat connection.
///
/// `Connecting -> Authenticating -> ReplayingHistory -> Live -> Closed`,
/// with `Closed` reachable from every non-terminal state (client disconnect,
/// rejected handshake, transport error). No transitions leave `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Connecting,
    Authenticating,
    ReplayingHistory,
    Live,
    Closed,
}

impl ConnectionState {
    /// Whether moving to `next` is a legal transition.
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        match (self, next) {
            (Closed, _) => false,
            (_, Closed) => true,
            (Connecting, Authenticating)
            | (Authenticating, ReplayingHistory)
            | (ReplayingHistory, Live) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Authenticating => "authenticating",
            ConnectionState::ReplayingHistory => "replaying_history",
            ConnectionState::Live => "live",
            ConnectionState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Context for one authenticated, live connection.
///
/// Owns a clone of the session's outbound frame sender so the router can
/// report errors to the originating session. The WebSocket transport itself
/// stays with the connection task; nothing here closes it.
#[derive(Debug, Clone)]
pub struct LiveSession {
    /// Unique handle identity for registry bookkeeping.
    pub session_id: Uuid,
    /// Authenticated principal.
    pub user_id: UserId,
    /// The other participant.
    pub peer_id: UserId,
    /// Conversation partition this session is bound to.
    pub key: ConversationKey,
    /// Outbound frame queue for this session.
    pub outbound: mpsc::UnboundedSender<ServerFrame>,
}

impl LiveSession {
    pub fn new(
        user_id: UserId,
        peer_id: UserId,
        outbound: mpsc::UnboundedSender<ServerFrame>,
    ) -> Self {
        let key = ConversationKey::for_pair(&user_id, &peer_id);
        Self {
            session_id: Uuid::now_v7(),
            user_id,
            peer_id,
            key,
            outbound,
        }
    }

    /// Send a frame to this session only. Errors are ignored: a closed
    /// channel means the connection task is already tearing down.
    pub fn send(&self, frame: ServerFrame) {
        let _ = self.outbound.send(frame);
    }
}
