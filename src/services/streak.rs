//! Streak services - the daily pair check-in.

use crate::core::{AppError, AppState, AuthUser};
use crate::dtos::StreakDTO;
use crate::entities::ConversationKey;
use crate::repositories::Read;
use crate::services::today;
use axum::{
    Extension,
    extract::{Json, State},
};
use std::sync::Arc;
use tracing::{info, instrument};

/// Check-and-increment for the caller's partner pair. The streak lives
/// on one shared pair record, so whichever partner checks in first does
/// the increment and the other sees `already_updated_today`.
#[instrument(skip(state), fields(uid = %auth.uid))]
pub async fn check_in(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<StreakDTO>, AppError> {
    let day = today();

    let me = state
        .user
        .read(&auth.uid)
        .await?
        .ok_or_else(|| AppError::not_found("User not registered"))?;

    let partner_uid = me.partner_uid.ok_or_else(AppError::no_partner)?;

    let pair_key = ConversationKey::new(&auth.uid, &partner_uid).pair_key();

    // Pairs formed before streak seeding existed may have no row yet.
    state.streak.seed(&pair_key).await?;

    let incremented = state.streak.try_increment(&pair_key, day).await?;

    let streak = state
        .streak
        .read(&pair_key)
        .await?
        .ok_or_else(|| AppError::internal_server_error("Streak record missing"))?;

    info!(
        count = streak.streak_count,
        incremented, "Streak check-in processed"
    );

    Ok(Json(StreakDTO {
        streak_count: streak.streak_count,
        already_updated_today: !incremented,
        last_increment_date: streak.last_increment_date,
    }))
}
