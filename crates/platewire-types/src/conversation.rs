//! Canonical conversation key for a pair of users.
//!
//! Both directions of a conversation must address the same storage partition
//! and the same fan-out targets, so the key is order-independent: the two
//! user ids sorted lexicographically and joined with `:`. Collision freedom
//! for distinct unordered pairs follows from `:` being forbidden inside a
//! [`UserId`].

use serde::{Deserialize, Serialize};

use crate::user::UserId;

/// Order-independent identifier for a two-party conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationKey(String);

impl ConversationKey {
    /// Resolve the canonical key for an unordered pair of users.
    ///
    /// Commutative: `for_pair(a, b) == for_pair(b, a)`.
    pub fn for_pair(a: &UserId, b: &UserId) -> Self {
        let (lo, hi) = if a.as_str() <= b.as_str() {
            (a, b)
        } else {
            (b, a)
        };
        Self(format!("{lo}:{hi}"))
    }

    /// Wrap a key string read back from storage. No validation: storage
    /// only ever holds keys produced by [`ConversationKey::for_pair`].
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
