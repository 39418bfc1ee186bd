//! Matching services - the daily opt-in queue and swipe flow.
//!
//! The partnership compare-and-set: a swipe-right first records its own
//! interest, then checks for the reverse one. Each half of a formed
//! partnership is a guarded single-statement update, so two users
//! swiping each other near-simultaneously converge on exactly one
//! partnership, and a competing third-party swipe loses cleanly (its
//! own half is rolled back, nothing else changes).

use crate::core::{AppError, AppState, AuthUser};
use crate::dtos::{MatchCandidateDTO, OptInResultDTO, SwipeDTO, SwipeDirection, SwipeResultDTO};
use crate::entities::{ConversationKey, User};
use crate::repositories::Read;
use crate::services::today;
use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// A lost race is retried this many times before surfacing the conflict.
const SWIPE_RETRY_ATTEMPTS: u32 = 3;

/// Ephemeral swipe-left exclusions, per user per day. Lost on restart
/// by design: a left swipe only trims the current session's deck.
pub struct SwipeSkips {
    skips: DashMap<String, (NaiveDate, HashSet<String>)>,
}

impl SwipeSkips {
    pub fn new() -> Self {
        SwipeSkips {
            skips: DashMap::new(),
        }
    }

    pub fn skip(&self, uid: &str, candidate_uid: &str, day: NaiveDate) {
        let mut entry = self
            .skips
            .entry(uid.to_string())
            .or_insert_with(|| (day, HashSet::new()));
        if entry.0 != day {
            // stale set from a previous day
            *entry = (day, HashSet::new());
        }
        entry.1.insert(candidate_uid.to_string());
    }

    pub fn skipped_today(&self, uid: &str, day: NaiveDate) -> HashSet<String> {
        self.skips
            .get(uid)
            .filter(|entry| entry.0 == day)
            .map(|entry| entry.1.clone())
            .unwrap_or_default()
    }
}

impl Default for SwipeSkips {
    fn default() -> Self {
        Self::new()
    }
}

#[instrument(skip(state), fields(uid = %auth.uid))]
pub async fn opt_in(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<OptInResultDTO>, AppError> {
    let day = today();
    let user = require_registered(&state, &auth.uid).await?;

    let already = user.opted_in_on(day);
    if !already {
        state.user.opt_in(&auth.uid, day).await?;
        info!("User opted in for today");
    } else {
        debug!("Opt-in repeated, no-op");
    }

    Ok(Json(OptInResultDTO {
        opted_in_date: day,
        already_opted_in: already,
    }))
}

/// Today's candidate snapshot for the caller. Recomputed per call; the
/// client cycles over the snapshot and refreshes with a new fetch.
#[instrument(skip(state), fields(uid = %auth.uid))]
pub async fn list_candidates(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<Vec<MatchCandidateDTO>>, AppError> {
    let day = today();
    let user = require_registered(&state, &auth.uid).await?;

    if user.partner_uid.is_some() {
        debug!("Caller already partnered, empty queue");
        return Ok(Json(vec![]));
    }

    let Some((language, solving_time)) = user.matching_profile() else {
        return Err(AppError::validation(
            "Set a preferred language and solving time before matching",
        ));
    };

    let skipped = state.swipe_skips.skipped_today(&auth.uid, day);
    let candidates = state
        .user
        .find_candidates(&auth.uid, language, solving_time, day)
        .await?
        .into_iter()
        .filter(|c| !skipped.contains(&c.uid))
        .map(MatchCandidateDTO::from)
        .collect::<Vec<_>>();

    info!(count = candidates.len(), "Candidate snapshot computed");
    Ok(Json(candidates))
}

#[instrument(skip(state, body), fields(uid = %auth.uid, candidate = %body.candidate_uid, direction = ?body.direction))]
pub async fn swipe(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<SwipeDTO>,
) -> Result<(StatusCode, Json<SwipeResultDTO>), AppError> {
    if body.candidate_uid == auth.uid {
        return Err(AppError::validation("Cannot swipe on yourself"));
    }

    match body.direction {
        SwipeDirection::Left => {
            state
                .swipe_skips
                .skip(&auth.uid, &body.candidate_uid, today());
            Ok((
                StatusCode::OK,
                Json(SwipeResultDTO {
                    matched: false,
                    partner_uid: None,
                }),
            ))
        }
        SwipeDirection::Right => {
            // Re-fetch and retry a bounded number of times on a lost
            // race, then surface the conflict to the user.
            let mut attempt = 0;
            loop {
                match swipe_right_once(&state, &auth.uid, &body.candidate_uid).await {
                    Err(err)
                        if err.status() == StatusCode::CONFLICT
                            && attempt + 1 < SWIPE_RETRY_ATTEMPTS =>
                    {
                        attempt += 1;
                        warn!(attempt, "Swipe race lost, retrying");
                    }
                    Err(err) => return Err(err),
                    Ok(result) => return Ok((StatusCode::OK, Json(result))),
                }
            }
        }
    }
}

async fn swipe_right_once(
    state: &AppState,
    uid: &str,
    candidate_uid: &str,
) -> Result<SwipeResultDTO, AppError> {
    let me = require_registered(state, uid).await?;

    match me.partner_uid.as_deref() {
        // Repeating the swipe that formed the partnership is a no-op.
        Some(partner) if partner == candidate_uid => {
            return Ok(SwipeResultDTO {
                matched: true,
                partner_uid: Some(candidate_uid.to_string()),
            });
        }
        Some(_) => return Err(AppError::validation("You already have a partner")),
        None => {}
    }

    let candidate = state
        .user
        .read(&candidate_uid.to_string())
        .await?
        .ok_or_else(|| AppError::not_found("Candidate not found"))?;

    if let Some(partner) = candidate.partner_uid.as_deref() {
        if partner != uid {
            return Err(AppError::conflict("Candidate already partnered"));
        }
    }

    // Record own interest before checking the reverse one: whichever of
    // two mutual swipes runs second is guaranteed to observe the first.
    state.requests.record_interest(uid, candidate_uid).await?;

    let mutual = state
        .requests
        .find_interest(candidate_uid, uid)
        .await?
        .is_some();

    if !mutual {
        debug!("Interest recorded, waiting for the other side");
        return Ok(SwipeResultDTO {
            matched: false,
            partner_uid: None,
        });
    }

    form_partnership(state, uid, candidate_uid).await?;

    info!("Partnership formed");
    Ok(SwipeResultDTO {
        matched: true,
        partner_uid: Some(candidate_uid.to_string()),
    })
}

/// Apply both halves of the partnership via guarded updates. The guard
/// accepts "already points at the other half", so the two sides of a
/// mutual race can interleave in any order; only a third party in
/// between makes a half fail, and that half is rolled back.
async fn form_partnership(state: &AppState, uid: &str, candidate_uid: &str) -> Result<(), AppError> {
    if !state.user.set_partner_guarded(uid, candidate_uid).await? {
        return Err(AppError::conflict("Partner state changed, try again"));
    }

    if !state.user.set_partner_guarded(candidate_uid, uid).await? {
        state.user.clear_partner_if(uid, candidate_uid).await?;
        return Err(AppError::conflict("Candidate was matched by someone else"));
    }

    state.requests.delete_pair(uid, candidate_uid).await?;
    state
        .streak
        .seed(&ConversationKey::new(uid, candidate_uid).pair_key())
        .await?;

    Ok(())
}

async fn require_registered(state: &AppState, uid: &str) -> Result<User, AppError> {
    state
        .user
        .read(&uid.to_string())
        .await?
        .ok_or_else(|| AppError::not_found("User not registered"))
}
