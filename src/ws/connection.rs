//! WebSocket connection management.
//!
//! Each accepted socket is split into a listen task (inbound client
//! events) and a write task (outbound fan-out plus control signals).
//! The write task owns a StreamMap of broadcast subscriptions, one per
//! joined conversation, and flushes fan-out messages in small batches.

use crate::core::AppState;
use crate::dtos::{ClientEvent, MessageDTO, ServerEvent};
use crate::ws::events::process_event;
use crate::ws::presence::InternalSignal;
use crate::ws::{BATCH_INTERVAL_MILLIS, BATCH_MAX_SIZE, RATE_LIMITER_MILLIS, TIMEOUT_DURATION_SECONDS};
use axum::extract::ws::{Message, Utf8Bytes, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::{Duration, interval, timeout};
use tokio_stream::StreamMap;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info, instrument, warn};

#[instrument(skip(ws, state), fields(uid = %uid))]
pub async fn handle_socket(ws: WebSocket, state: Arc<AppState>, uid: String) {
    info!("WebSocket connection established");

    let (ws_tx, ws_rx) = ws.split();
    let (int_tx, int_rx) = unbounded_channel::<InternalSignal>();

    state.presence.register_online(&uid, int_tx.clone());

    tokio::spawn(listen_ws(uid.clone(), ws_rx, int_tx, state.clone()));
    tokio::spawn(write_ws(uid, ws_tx, int_rx, state));
}

/// Outbound half: drains joined-conversation broadcasts into batches
/// and forwards control signals. Subscriptions start empty; the listen
/// task adds one per Join event (conversations are derived from the
/// message history, there is no membership table to preload).
#[instrument(skip(websocket_tx, internal_rx, state), fields(uid = %uid))]
pub async fn write_ws(
    uid: String,
    mut websocket_tx: SplitSink<WebSocket, Message>,
    mut internal_rx: UnboundedReceiver<InternalSignal>,
    state: Arc<AppState>,
) {
    info!("Write task started");

    let mut stream_map: StreamMap<crate::entities::ConversationKey, BroadcastStream<Arc<MessageDTO>>> =
        StreamMap::new();

    let mut batch: Vec<MessageDTO> = Vec::new();
    let mut flush_interval = interval(Duration::from_millis(BATCH_INTERVAL_MILLIS));
    flush_interval.tick().await; // consume the immediate first tick

    'outer: loop {
        tokio::select! {
            Some((_, result)) = tokio_stream::StreamExt::next(&mut stream_map) => {
                if let Ok(msg) = result {
                    batch.push((*msg).clone());
                    if batch.len() >= BATCH_MAX_SIZE {
                        if send_batch(&mut websocket_tx, &mut batch).await.is_err() {
                            warn!("Failed to send batch, closing connection");
                            break 'outer;
                        }
                    }
                }
                // A lagged receiver just skips; the client reconciles
                // missed messages from the history endpoint.
            }

            _ = flush_interval.tick() => {
                if !batch.is_empty()
                    && send_batch(&mut websocket_tx, &mut batch).await.is_err()
                {
                    warn!("Failed to send batch on interval, closing connection");
                    break 'outer;
                }
            }

            signal = internal_rx.recv() => {
                match signal {
                    Some(InternalSignal::Shutdown) => {
                        info!("Shutdown signal received");
                        break 'outer;
                    }
                    Some(InternalSignal::Subscribe(key)) => {
                        info!(conversation = %key, "Adding conversation subscription");
                        let rx = state.conversations.subscribe(&key);
                        stream_map.insert(key, BroadcastStream::new(rx));
                    }
                    Some(InternalSignal::Unsubscribe(key)) => {
                        info!(conversation = %key, "Removing conversation subscription");
                        stream_map.remove(&key);
                    }
                    Some(InternalSignal::Unread { peer_uid }) => {
                        if send_event(&mut websocket_tx, &ServerEvent::Unread { peer_uid }).await.is_err() {
                            break 'outer;
                        }
                    }
                    Some(InternalSignal::Error { code, message }) => {
                        warn!(code, %message, "Sending error event to client");
                        if send_event(&mut websocket_tx, &ServerEvent::Error { code, message }).await.is_err() {
                            break 'outer;
                        }
                    }
                    None => {
                        info!("Internal channel closed");
                        break 'outer;
                    }
                }
            }
        }
    }

    if !batch.is_empty() {
        let _ = send_batch(&mut websocket_tx, &mut batch).await;
    }

    info!("Write task terminated");
}

async fn send_batch(
    websocket_tx: &mut SplitSink<WebSocket, Message>,
    batch: &mut Vec<MessageDTO>,
) -> Result<(), axum::Error> {
    let event = ServerEvent::Messages(std::mem::take(batch));
    send_event(websocket_tx, &event).await
}

async fn send_event(
    websocket_tx: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(|e| {
        error!("Failed to serialize server event: {:?}", e);
        axum::Error::new(e)
    })?;
    websocket_tx.send(Message::Text(Utf8Bytes::from(json))).await
}

/// Inbound half: decodes client events with an idle timeout and a
/// light rate limit, then hands them to the event processor.
#[instrument(skip(websocket_rx, internal_tx, state), fields(uid = %uid))]
pub async fn listen_ws(
    uid: String,
    mut websocket_rx: SplitStream<WebSocket>,
    internal_tx: UnboundedSender<InternalSignal>,
    state: Arc<AppState>,
) {
    info!("Listen task started");

    let mut rate_limiter = interval(Duration::from_millis(RATE_LIMITER_MILLIS));
    let timeout_duration = Duration::from_secs(TIMEOUT_DURATION_SECONDS);

    loop {
        match timeout(timeout_duration, StreamExt::next(&mut websocket_rx)).await {
            Ok(Some(msg_result)) => {
                rate_limiter.tick().await;

                let msg = match msg_result {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("WebSocket error: {:?}", e);
                        break;
                    }
                };

                match msg {
                    Message::Text(text) => match serde_json::from_str::<ClientEvent>(&text) {
                        Ok(event) => process_event(&state, &uid, event, &internal_tx).await,
                        Err(_) => {
                            warn!("Failed to deserialize client event");
                            let _ = internal_tx.send(InternalSignal::Error {
                                code: 400,
                                message: "Malformed event".to_string(),
                            });
                        }
                    },
                    Message::Close(_) => {
                        info!("Close message received");
                        break;
                    }
                    _ => {}
                }
            }
            Ok(None) => {
                info!("WebSocket stream ended");
                break;
            }
            Err(_) => {
                warn!(timeout_secs = TIMEOUT_DURATION_SECONDS, "Connection timeout");
                break;
            }
        }
    }

    info!("Cleaning up connection");
    let _ = internal_tx.send(InternalSignal::Shutdown);
    state.presence.remove_from_online(&uid, &internal_tx);
    info!("Listen task terminated");
}
