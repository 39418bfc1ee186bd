//! Message entity - immutable once appended.

use super::ConversationKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Message {
    /// Assigned by the store at append time; globally unique, so any
    /// consumer can de-duplicate deliveries by this id alone.
    pub message_id: i64,
    pub sender_uid: String,
    pub receiver_uid: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn conversation_key(&self) -> ConversationKey {
        ConversationKey::new(&self.sender_uid, &self.receiver_uid)
    }
}
