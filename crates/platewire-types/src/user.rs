//! User identifier newtype.
//!
//! User identity is owned by the surrounding application; this subsystem
//! only needs an opaque, validated identifier. Validation exists because the
//! identifier is embedded in access tokens (dot-separated) and conversation
//! keys (colon-separated), so a small character set restriction keeps both
//! encodings unambiguous.

use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Opaque identifier for a user of the messaging subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Validate and wrap a raw user identifier.
    ///
    /// Rejects empty identifiers, identifiers containing `:` (reserved as
    /// the conversation key separator), and identifiers containing
    /// whitespace.
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        if raw.is_empty() {
            return Err(AuthError::BadUserId("empty user id".to_string()));
        }
        if raw.contains(':') {
            return Err(AuthError::BadUserId(format!(
                "user id '{raw}' contains reserved character ':'"
            )));
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(AuthError::BadUserId(format!(
                "user id '{raw}' contains whitespace"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_ids() {
        assert!(UserId::parse("alice").is_ok());
        assert!(UserId::parse("user-42").is_ok());
        // Dots are allowed -- token parsing splits from the right.
        assert!(UserId::parse("alice.smith").is_ok());
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(matches!(UserId::parse(""), Err(AuthError::BadUserId(_))));
    }

    #[test]
    fn test_parse_rejects_colon() {
        assert!(matches!(
            UserId::parse("a:b"),
            Err(AuthError::BadUserId(_))
        ));
    }

    #[test]
    fn test_parse_rejects_whitespace() {
        assert!(matches!(
            UserId::parse("a b"),
            Err(AuthError::BadUserId(_))
        ));
        assert!(matches!(
            UserId::parse("a\tb"),
            Err(AuthError::BadUserId(_))
        ));
    }

    #[test]
    fn test_serde_transparent() {
        let id = UserId::parse("alice").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"alice\"");
        let parsed: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
