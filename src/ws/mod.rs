//! WebSocket Module - the real-time relay.
//!
//! Handles the HTTP -> WebSocket upgrade, the per-connection read/write
//! tasks, the presence registry, and the per-conversation broadcast
//! channels. Delivery is at-least-once: a message is durably appended
//! before any fan-out, and clients de-duplicate by message id. A
//! dropped transport is non-fatal; clients reconnect, re-join, and
//! reconcile through the conversation history endpoint.

pub mod connection;
pub mod convmap;
pub mod events;
pub mod presence;

// Re-exports to keep imports short
pub use connection::handle_socket;

use crate::core::{AppState, AuthUser};
use axum::{
    Extension,
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;

/// Capacity of each conversation's broadcast channel.
pub const BROADCAST_CHANNEL_CAPACITY: usize = 64;
/// Flush outgoing messages once this many are queued...
pub const BATCH_MAX_SIZE: usize = 10;
/// ...or when this many milliseconds have passed, whichever is first.
pub const BATCH_INTERVAL_MILLIS: u64 = 50;
/// Minimum spacing between inbound client events.
pub const RATE_LIMITER_MILLIS: u64 = 25;
/// Idle connections are dropped after this long without traffic.
pub const TIMEOUT_DURATION_SECONDS: u64 = 300;

/// Entry point for WebSocket upgrade requests. The connection's
/// identity is the verified token uid from the authentication
/// middleware; nothing the client sends can change it.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, auth.uid))
}
