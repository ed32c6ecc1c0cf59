//! Wire frames exchanged over a chat WebSocket.
//!
//! Inbound frames carry just a message body. Outbound frames are tagged by
//! `type` so clients can tell the one-time backlog from live arrivals
//! without re-deriving state:
//!
//! - `{"type":"history","messages":[...]}` -- sent once after the handshake,
//!   oldest message first.
//! - `{"type":"message","id",...}` -- one per new message, including the
//!   sender's own echo.
//! - `{"type":"error","code","message"}` -- inline error report; the
//!   connection stays open.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::FrameError;
use crate::message::ChatMessage;
use crate::user::UserId;

/// Inbound frame from a chat client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientFrame {
    /// Message body text.
    pub message: String,
}

impl ClientFrame {
    /// Parse and validate a raw text frame.
    ///
    /// Rejects invalid JSON, missing fields, and bodies that are empty or
    /// whitespace-only.
    pub fn parse(raw: &str) -> Result<Self, FrameError> {
        let frame: ClientFrame =
            serde_json::from_str(raw).map_err(|e| FrameError::Malformed(e.to_string()))?;
        if frame.message.trim().is_empty() {
            return Err(FrameError::EmptyBody);
        }
        Ok(frame)
    }
}

/// A message as rendered on the wire (backlog entries and live frames share
/// this shape).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub id: Uuid,
    pub from_user: UserId,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for WireMessage {
    fn from(msg: ChatMessage) -> Self {
        Self {
            id: msg.id,
            from_user: msg.from_user,
            message: msg.body,
            created_at: msg.created_at,
        }
    }
}

/// Machine-readable error codes carried by error frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    MalformedFrame,
    StorageUnavailable,
}

/// Outbound frame from the server to a chat client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    /// One-time backlog, ascending chronological order.
    History { messages: Vec<WireMessage> },
    /// A newly persisted message.
    Message {
        id: Uuid,
        from_user: UserId,
        message: String,
        created_at: DateTime<Utc>,
    },
    /// Inline error report. Sent only to the originating session.
    Error { code: ErrorCode, message: String },
}

impl ServerFrame {
    /// Build the backlog frame from persisted records (already ascending).
    pub fn history(messages: Vec<ChatMessage>) -> Self {
        Self::History {
            messages: messages.into_iter().map(WireMessage::from).collect(),
        }
    }

    /// Build a live frame for a persisted message.
    pub fn live(msg: &ChatMessage) -> Self {
        Self::Message {
            id: msg.id,
            from_user: msg.from_user.clone(),
            message: msg.body.clone(),
            created_at: msg.created_at,
        }
    }

    /// Build an inline error frame.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::ConversationKey;

    fn sample_message(body: &str) -> ChatMessage {
        let a = UserId::parse("alice").unwrap();
        let b = UserId::parse("bob").unwrap();
        ChatMessage {
            id: Uuid::now_v7(),
            conversation_key: ConversationKey::for_pair(&a, &b),
            seq: 1,
            from_user: a,
            body: body.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_client_frame_parse_valid() {
        let frame = ClientFrame::parse(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(frame.message, "hi");
    }

    #[test]
    fn test_client_frame_parse_missing_field() {
        assert!(matches!(
            ClientFrame::parse("{}"),
            Err(FrameError::Malformed(_))
        ));
    }

    #[test]
    fn test_client_frame_parse_not_json() {
        assert!(matches!(
            ClientFrame::parse("hello"),
            Err(FrameError::Malformed(_))
        ));
    }

    #[test]
    fn test_client_frame_parse_empty_body() {
        assert!(matches!(
            ClientFrame::parse(r#"{"message":""}"#),
            Err(FrameError::EmptyBody)
        ));
        assert!(matches!(
            ClientFrame::parse(r#"{"message":"   "}"#),
            Err(FrameError::EmptyBody)
        ));
    }

    #[test]
    fn test_live_frame_shape() {
        let msg = sample_message("hi");
        let json = serde_json::to_value(ServerFrame::live(&msg)).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["from_user"], "alice");
        assert_eq!(json["message"], "hi");
        assert!(json["id"].is_string());
        assert!(json["created_at"].is_string());
    }

    #[test]
    fn test_history_frame_shape() {
        let frame = ServerFrame::history(vec![sample_message("one"), sample_message("two")]);
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "history");
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["messages"][0]["message"], "one");
    }

    #[test]
    fn test_empty_history_frame() {
        let json = serde_json::to_value(ServerFrame::history(Vec::new())).unwrap();
        assert_eq!(json.to_string(), r#"{"messages":[],"type":"history"}"#);
    }

    #[test]
    fn test_error_frame_shape() {
        let frame = ServerFrame::error(ErrorCode::StorageUnavailable, "append failed");
        let json = serde_json::to_value(&frame).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["code"], "storage_unavailable");
        assert_eq!(json["message"], "append failed");
    }
}
