//! Message DTOs.

use crate::entities::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub message_id: i64,
    pub sender_uid: String,
    pub receiver_uid: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageDTO {
    fn from(value: Message) -> Self {
        Self {
            message_id: value.message_id,
            sender_uid: value.sender_uid,
            receiver_uid: value.receiver_uid,
            body: value.body,
            created_at: value.created_at,
        }
    }
}

/// Internal creation shape handed to the repository once the send has
/// been validated; `message_id` and `created_at` are assigned at append.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateMessageDTO {
    pub sender_uid: String,
    pub receiver_uid: String,
    pub body: String,
}

/// Body for sending a message over REST; the sender comes from the
/// authenticated identity and the receiver from the path.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct SendMessageDTO {
    #[validate(length(min = 1, max = 5000, message = "Message body must be between 1 and 5000 characters"))]
    pub body: String,
}
