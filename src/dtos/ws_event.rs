//! WebSocket event DTOs - the relay wire protocol.
//!
//! Tagged unions, serialized by serde as
//! `{ "type": "Join", "data": { ... } }`. The connection's identity is
//! always the verified token uid; client events only ever name the peer,
//! so there is no self-identity field to spoof.

use crate::dtos::MessageDTO;
use serde::{Deserialize, Serialize};

/// Events a client may send over the relay connection.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "data")]
pub enum ClientEvent {
    /// Scope delivery to the conversation with `peer_uid`.
    Join { peer_uid: String },
    Leave { peer_uid: String },
    /// Persist and fan out a message to `peer_uid`.
    Send { peer_uid: String, body: String },
    /// Best-effort hint that this conversation is on screen; suppresses
    /// unread marks while active. Advisory only.
    Viewing { peer_uid: String },
    Blur,
    MarkRead { peer_uid: String },
}

/// Events the server pushes to a connected client.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "data")]
pub enum ServerEvent {
    /// Fan-out batch for conversations the client has joined. Delivery is
    /// at-least-once; de-duplicate by `message_id`.
    Messages(Vec<MessageDTO>),
    /// A message arrived while this conversation was not on screen.
    Unread { peer_uid: String },
    Error { code: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_event_wire_shape() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"type":"Send","data":{"peer_uid":"u2","body":"hi"}}"#)
                .unwrap();
        match event {
            ClientEvent::Send { peer_uid, body } => {
                assert_eq!(peer_uid, "u2");
                assert_eq!(body, "hi");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn server_event_tags() {
        let json = serde_json::to_string(&ServerEvent::Unread {
            peer_uid: "u1".into(),
        })
        .unwrap();
        assert!(json.contains(r#""type":"Unread""#));
    }
}
