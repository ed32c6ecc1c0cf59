//! WebSocket handler for real-time chat connections.
//!
//! The `/api/v1/chat/{peer_id}/ws` endpoint upgrades an HTTP connection to
//! a WebSocket bound to one conversation. Per connection:
//!
//! 1. **Authenticate** the `token` query parameter before the upgrade;
//!    rejection happens as a plain HTTP error and nothing is registered.
//! 2. **Register** the session in the [`SessionRegistry`] so concurrent
//!    fan-out starts queueing in its channel immediately.
//! 3. **Replay** the history backlog as a single `history` frame, then
//!    flush anything queued during the fetch.
//! 4. **Live mode:** `tokio::select!` multiplexes queued outbound frames,
//!    inbound client frames (routed through the [`MessageRouter`]), and the
//!    server shutdown token.
//! 5. On disconnect the session is unregistered. The registry only ever
//!    holds frame senders, so cleanup cannot close the socket twice.
//!
//! [`SessionRegistry`]: platewire_core::registry::SessionRegistry
//! [`MessageRouter`]: platewire_core::router::MessageRouter

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, Query, State};
use axum::response::Response;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;

use platewire_core::registry::SessionHandle;
use platewire_core::session::{ConnectionState, LiveSession};
use platewire_types::frame::{ErrorCode, ServerFrame};
use platewire_types::user::UserId;

use crate::http::error::AppError;
use crate::state::AppState;

/// Handshake query parameters. The credential travels here because browser
/// WebSocket clients cannot set headers on the upgrade request.
#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: String,
}

/// Upgrade an HTTP request to a chat WebSocket.
///
/// Authentication happens *before* the upgrade: an invalid or expired token
/// is rejected with 401 and no socket is ever opened.
pub async fn chat_ws(
    ws: WebSocketUpgrade,
    Path(peer_id): Path<String>,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let principal = state.auth.verify(&query.token)?;
    let peer = UserId::parse(&peer_id)?;

    Ok(ws.on_upgrade(move |socket| handle_chat_connection(socket, state, principal, peer)))
}

/// Core connection handler, running as its own task for the life of the
/// connection.
async fn handle_chat_connection(socket: WebSocket, state: AppState, user: UserId, peer: UserId) {
    // The token was verified in the HTTP handler, so the connection enters
    // this task already past Connecting/Authenticating.
    let mut conn_state = ConnectionState::Authenticating;

    let (mut ws_sender, mut ws_receiver) = socket.split();

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let session = LiveSession::new(user.clone(), peer, tx.clone());

    tracing::info!(
        user = %session.user_id,
        peer = %session.peer_id,
        key = %session.key,
        session = %session.session_id,
        "chat connection established"
    );

    // Register before the backlog fetch: messages fanned out while we read
    // history queue in `rx` and are flushed after the history frame, so a
    // freshly connected session can never permanently miss one.
    state
        .registry
        .register(&user, SessionHandle::new(session.session_id, tx));

    advance(&mut conn_state, ConnectionState::ReplayingHistory, &session);

    let backlog = match state.replayer.backlog(&session.key).await {
        Ok(frame) => frame,
        Err(err) => {
            // Entering live mode without a backlog would leave a gap the
            // client cannot detect. Report and close instead.
            tracing::warn!(key = %session.key, error = %err, "history replay failed, closing");
            let frame = ServerFrame::error(ErrorCode::StorageUnavailable, err.to_string());
            let _ = send_frame(&mut ws_sender, &frame).await;
            close_connection(&state, &session, &mut conn_state);
            return;
        }
    };

    if send_frame(&mut ws_sender, &backlog).await.is_err() {
        close_connection(&state, &session, &mut conn_state);
        return;
    }

    advance(&mut conn_state, ConnectionState::Live, &session);

    loop {
        tokio::select! {
            // --- Branch 1: server shutting down ---
            _ = state.shutdown.cancelled() => {
                break;
            }

            // --- Branch 2: deliver queued outbound frames ---
            frame = rx.recv() => {
                match frame {
                    Some(frame) => {
                        if send_frame(&mut ws_sender, &frame).await.is_err() {
                            // Client disconnected mid-send.
                            break;
                        }
                    }
                    // Sender side gone; only happens after unregister.
                    None => break,
                }
            }

            // --- Branch 3: inbound frames from the client ---
            msg_result = ws_receiver.next() => {
                match msg_result {
                    Some(Ok(Message::Text(text))) => {
                        state.router.handle_inbound(&session, &text).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        // Client disconnected
                        break;
                    }
                    Some(Err(err)) => {
                        tracing::debug!(session = %session.session_id, "WebSocket receive error: {err}");
                        break;
                    }
                    // Ignore binary, ping, pong protocol frames (handled by axum/tungstenite)
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    close_connection(&state, &session, &mut conn_state);
}

/// Serialize and send one frame. Serialization failure is logged and the
/// frame skipped; a transport failure is returned so the caller can close.
async fn send_frame(
    ws_sender: &mut SplitSink<WebSocket, Message>,
    frame: &ServerFrame,
) -> Result<(), ()> {
    let json = match serde_json::to_string(frame) {
        Ok(json) => json,
        Err(err) => {
            tracing::warn!("Failed to serialize ServerFrame: {err}");
            return Ok(());
        }
    };
    ws_sender
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

/// Unregister the session and mark the state machine terminal.
fn close_connection(state: &AppState, session: &LiveSession, conn_state: &mut ConnectionState) {
    state.registry.unregister(&session.user_id, session.session_id);
    advance(conn_state, ConnectionState::Closed, session);
    tracing::info!(
        user = %session.user_id,
        session = %session.session_id,
        "chat connection closed"
    );
}

/// Apply a state transition, tracing it. Illegal transitions indicate a
/// handler bug and are logged at warn rather than panicking mid-connection.
fn advance(current: &mut ConnectionState, next: ConnectionState, session: &LiveSession) {
    if !current.can_transition_to(next) {
        tracing::warn!(
            session = %session.session_id,
            from = %current,
            to = %next,
            "illegal connection state transition"
        );
        return;
    }
    tracing::debug!(session = %session.session_id, from = %current, to = %next, "connection state");
    *current = next;
}
