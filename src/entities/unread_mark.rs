//! UnreadMark entity - badge state per (owner, other user) pair.
//!
//! Derived state: a mark means at least one message from `other_uid`
//! arrived since the owner's last mark-read for that conversation. It is
//! safe to reconstruct from the message history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct UnreadMark {
    pub owner_uid: String,
    pub other_uid: String,
    pub marked_at: DateTime<Utc>,
}
