use thiserror::Error;

/// Errors from the message store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not accept the operation. A message that
    /// fails to persist must never be fanned out.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("query error: {0}")]
    Query(String),

    /// A persisted row could not be decoded.
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Errors from handshake authentication.
///
/// All of these reject the connection before any data is exchanged; no
/// registry entry or other partial state is created.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid access token")]
    InvalidToken,

    #[error("access token expired")]
    Expired,

    #[error("invalid user id: {0}")]
    BadUserId(String),
}

/// Errors from parsing an inbound client frame.
///
/// Reported inline as an error frame; the connection stays open.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("message body must not be empty")]
    EmptyBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_display() {
        let err = StoreError::Unavailable("pool closed".to_string());
        assert_eq!(err.to_string(), "storage unavailable: pool closed");
    }

    #[test]
    fn test_auth_error_display() {
        assert_eq!(AuthError::Expired.to_string(), "access token expired");
        let err = AuthError::BadUserId("empty user id".to_string());
        assert!(err.to_string().contains("empty user id"));
    }

    #[test]
    fn test_frame_error_display() {
        assert_eq!(
            FrameError::EmptyBody.to_string(),
            "message body must not be empty"
        );
    }
}
