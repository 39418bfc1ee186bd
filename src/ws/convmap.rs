//! ConversationMap - broadcast channel per live conversation.
//!
//! Channels are created lazily on first subscribe and torn down when a
//! send finds no receivers left. Payloads are `Arc<MessageDTO>` so the
//! fan-out shares one allocation across every subscriber.

use crate::dtos::MessageDTO;
use crate::entities::ConversationKey;
use crate::ws::BROADCAST_CHANNEL_CAPACITY;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::SendError;
use tokio::sync::broadcast::{Receiver, Sender};
use tracing::{debug, info};

pub struct ConversationMap {
    channels: DashMap<ConversationKey, Sender<Arc<MessageDTO>>>,
}

impl ConversationMap {
    pub fn new() -> Self {
        ConversationMap {
            channels: DashMap::new(),
        }
    }

    pub fn subscribe(&self, key: &ConversationKey) -> Receiver<Arc<MessageDTO>> {
        match self.channels.get(key) {
            None => {
                info!(conversation = %key, "Creating broadcast channel");
                let (tx, rx) = broadcast::channel::<Arc<MessageDTO>>(BROADCAST_CHANNEL_CAPACITY);
                self.channels.insert(key.clone(), tx);
                rx
            }
            Some(entry) => entry.value().subscribe(),
        }
    }

    /// Fan a persisted message out to the conversation's subscribers.
    /// Returns the number of receivers reached; an Err means nobody was
    /// listening, which is fine - the message is already durable and
    /// will be picked up by the next history fetch.
    pub fn send(
        &self,
        key: &ConversationKey,
        msg: Arc<MessageDTO>,
    ) -> Result<usize, SendError<Arc<MessageDTO>>> {
        if let Some(entry) = self.channels.get(key) {
            match entry.send(msg) {
                Ok(n) => {
                    debug!(conversation = %key, receivers = n, "Message broadcast");
                    Ok(n)
                }
                Err(e) => {
                    debug!(conversation = %key, "No active receivers, removing channel");
                    drop(entry); // release the map guard before removal
                    self.channels.remove(key);
                    Err(e)
                }
            }
        } else {
            debug!(conversation = %key, "No channel for conversation");
            Err(SendError(msg))
        }
    }
}

impl Default for ConversationMap {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn dto(id: i64) -> Arc<MessageDTO> {
        Arc::new(MessageDTO {
            message_id: id,
            sender_uid: "a".into(),
            receiver_uid: "b".into(),
            body: "hi".into(),
            created_at: Utc::now(),
        })
    }

    #[tokio::test]
    async fn subscribers_share_the_channel() {
        let map = ConversationMap::new();
        let key = ConversationKey::new("a", "b");

        let mut rx1 = map.subscribe(&key);
        let mut rx2 = map.subscribe(&ConversationKey::new("b", "a"));

        let reached = map.send(&key, dto(1)).expect("send should reach receivers");
        assert_eq!(reached, 2);
        assert_eq!(rx1.recv().await.unwrap().message_id, 1);
        assert_eq!(rx2.recv().await.unwrap().message_id, 1);
    }

    #[tokio::test]
    async fn send_without_listeners_is_err() {
        let map = ConversationMap::new();
        let key = ConversationKey::new("a", "b");

        assert!(map.send(&key, dto(1)).is_err());

        // Dropping the only receiver tears the channel down on next send.
        let rx = map.subscribe(&key);
        drop(rx);
        assert!(map.send(&key, dto(2)).is_err());
    }
}
