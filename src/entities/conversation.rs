//! ConversationKey - canonical identity of a two-user conversation.
//!
//! A conversation is the unordered pair of uids exchanging messages; there
//! is no stored conversation entity. Canonicalizing to (lo, hi) by
//! lexicographic order gives every consumer (broadcast channels, streak
//! records) the same key regardless of who initiated.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConversationKey {
    lo: String,
    hi: String,
}

impl ConversationKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self {
                lo: a.to_string(),
                hi: b.to_string(),
            }
        } else {
            Self {
                lo: b.to_string(),
                hi: a.to_string(),
            }
        }
    }

    pub fn contains(&self, uid: &str) -> bool {
        uid == self.lo || uid == self.hi
    }

    /// Storage key for per-pair records (pair_streaks.pair_key).
    pub fn pair_key(&self) -> String {
        format!("{}:{}", self.lo, self.hi)
    }
}

impl fmt::Display for ConversationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.lo, self.hi)
    }
}
