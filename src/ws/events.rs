//! WebSocket event handlers - the relay side of the message flow.
//!
//! Send goes through the same service path as the REST endpoint:
//! validate, persist, mark unread, then fan out. Errors are reported
//! back on the sender's own connection as Error events; the transport
//! never drops a failed send silently.

use crate::core::AppState;
use crate::dtos::ClientEvent;
use crate::entities::ConversationKey;
use crate::repositories::Delete;
use crate::services::messages::deliver;
use crate::ws::presence::InternalSignal;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument, warn};

#[instrument(skip(state, event, internal_tx), fields(uid = %uid))]
pub async fn process_event(
    state: &AppState,
    uid: &str,
    event: ClientEvent,
    internal_tx: &UnboundedSender<InternalSignal>,
) {
    match event {
        ClientEvent::Join { peer_uid } => {
            if peer_uid == uid {
                send_error(internal_tx, 400, "Cannot join a conversation with yourself");
                return;
            }
            // The key always contains the verified self; a client can
            // only ever join its own conversations.
            let key = ConversationKey::new(uid, &peer_uid);
            debug!(conversation = %key, "Join requested");
            let _ = internal_tx.send(InternalSignal::Subscribe(key));
        }

        ClientEvent::Leave { peer_uid } => {
            let key = ConversationKey::new(uid, &peer_uid);
            let _ = internal_tx.send(InternalSignal::Unsubscribe(key));
        }

        ClientEvent::Send { peer_uid, body } => {
            if let Err(err) = deliver(state, uid, &peer_uid, &body).await {
                warn!("Relay send failed");
                send_error(internal_tx, err.status().as_u16(), "Message not sent");
            }
        }

        ClientEvent::Viewing { peer_uid } => {
            // Advisory hint; never an error even if the peer is unknown.
            state.presence.set_viewing(uid, &peer_uid);
        }

        ClientEvent::Blur => {
            state.presence.clear_viewing(uid);
        }

        ClientEvent::MarkRead { peer_uid } => {
            let key = (uid.to_string(), peer_uid);
            if let Err(e) = state.unread.delete(&key).await {
                warn!("Failed to clear unread mark: {:?}", e);
                send_error(internal_tx, 503, "Mark-read failed, retry");
            }
        }
    }
}

fn send_error(internal_tx: &UnboundedSender<InternalSignal>, code: u16, message: &str) {
    let _ = internal_tx.send(InternalSignal::Error {
        code,
        message: message.to_string(),
    });
}
