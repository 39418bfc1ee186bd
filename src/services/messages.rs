//! Message services - conversation history, sending, unread badges.
//!
//! `deliver` is the single send path shared by the REST endpoint and
//! the relay: validate, persist (durable before any fan-out), mark
//! unread, then fan out to connected subscribers.

use crate::core::{AppError, AppState, AuthUser};
use crate::dtos::{CreateMessageDTO, MessageDTO, MessagesQuery, SendMessageDTO};
use crate::entities::Message;
use crate::repositories::{Create, Delete, Read};
use crate::ws::presence::InternalSignal;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 200;
const MAX_BODY_CHARS: usize = 5000;

/// Validate, persist, and fan out one direct message. Returns the
/// stored message with its assigned id (the de-duplication key for
/// at-least-once delivery).
pub async fn deliver(
    state: &AppState,
    sender_uid: &str,
    receiver_uid: &str,
    body: &str,
) -> Result<Message, AppError> {
    if sender_uid == receiver_uid {
        return Err(AppError::validation("Cannot message yourself"));
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Message body is empty"));
    }
    if trimmed.chars().count() > MAX_BODY_CHARS {
        return Err(AppError::validation("Message body too long"));
    }

    if state.user.read(&sender_uid.to_string()).await?.is_none() {
        return Err(AppError::not_found("Sender not registered"));
    }
    if state.user.read(&receiver_uid.to_string()).await?.is_none() {
        return Err(AppError::not_found("Receiver not found"));
    }

    // Durable first; everything after this point is best-effort
    // delivery on top of an already-persisted message.
    let message = state
        .msg
        .create(&CreateMessageDTO {
            sender_uid: sender_uid.to_string(),
            receiver_uid: receiver_uid.to_string(),
            body: trimmed.to_string(),
        })
        .await?;

    // Unread badge, unless the receiver's session says this
    // conversation is on screen right now (advisory hint).
    if !state.presence.is_viewing(receiver_uid, sender_uid) {
        state.unread.mark(receiver_uid, sender_uid).await?;
    }

    let key = message.conversation_key();
    let dto = Arc::new(MessageDTO::from(message.clone()));
    let fanned_out = state.conversations.send(&key, dto).unwrap_or(0);
    debug!(message_id = message.message_id, receivers = fanned_out, "Message fanned out");

    // Nudge an online receiver who is not looking at this conversation
    // so their badge updates without a refetch.
    if state.presence.is_online(receiver_uid)
        && !state.presence.is_viewing(receiver_uid, sender_uid)
    {
        state.presence.send_if_online(
            receiver_uid,
            InternalSignal::Unread {
                peer_uid: sender_uid.to_string(),
            },
        );
    }

    Ok(message)
}

#[instrument(skip(state, body), fields(uid = %auth.uid, peer = %peer_uid))]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(peer_uid): Path<String>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SendMessageDTO>,
) -> Result<(StatusCode, Json<MessageDTO>), AppError> {
    body.validate()?;

    let message = deliver(&state, &auth.uid, &peer_uid, &body.body).await?;
    Ok((StatusCode::CREATED, Json(MessageDTO::from(message))))
}

#[instrument(skip(state, params), fields(uid = %auth.uid, peer = %peer_uid))]
pub async fn list_conversation(
    State(state): State<Arc<AppState>>,
    Path(peer_uid): Path<String>,
    Query(params): Query<MessagesQuery>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<MessageDTO>>, AppError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let messages = state
        .msg
        .find_conversation_page(&auth.uid, &peer_uid, params.before, limit)
        .await?;

    info!(count = messages.len(), "Conversation page retrieved");
    Ok(Json(messages.into_iter().map(MessageDTO::from).collect()))
}

/// Distinct users the caller has a conversation with, most recent first.
#[instrument(skip(state), fields(uid = %auth.uid))]
pub async fn list_peers(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<String>>, AppError> {
    let peers = state.msg.find_conversation_peers(&auth.uid).await?;
    Ok(Json(peers))
}

#[instrument(skip(state), fields(uid = %auth.uid))]
pub async fn list_unread(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<String>>, AppError> {
    let marks = state.unread.find_many_by_owner(&auth.uid).await?;
    Ok(Json(marks.into_iter().map(|m| m.other_uid).collect()))
}

#[instrument(skip(state), fields(uid = %auth.uid, peer = %peer_uid))]
pub async fn mark_read(
    State(state): State<Arc<AppState>>,
    Path(peer_uid): Path<String>,
    Extension(auth): Extension<AuthUser>,
) -> Result<StatusCode, AppError> {
    state.unread.delete(&(auth.uid.clone(), peer_uid)).await?;
    Ok(StatusCode::NO_CONTENT)
}
