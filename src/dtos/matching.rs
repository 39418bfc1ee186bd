//! Matching DTOs - daily queue candidates and swipe actions.

use crate::entities::{SolvingTime, User};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Read-only projection of a user shown in the swipe deck; recomputed
/// per request, never persisted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MatchCandidateDTO {
    pub uid: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub preferred_language: Option<String>,
    pub preferred_solving_time: Option<SolvingTime>,
    pub dsa_sheet: Option<String>,
}

impl From<User> for MatchCandidateDTO {
    fn from(value: User) -> Self {
        Self {
            uid: value.uid,
            username: value.username,
            avatar_url: value.avatar_url,
            preferred_language: value.preferred_language,
            preferred_solving_time: value.preferred_solving_time,
            dsa_sheet: value.dsa_sheet,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

/// Body for POST /matching/swipe.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SwipeDTO {
    pub candidate_uid: String,
    pub direction: SwipeDirection,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SwipeResultDTO {
    /// True when the swipe completed a mutual match.
    pub matched: bool,
    pub partner_uid: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OptInResultDTO {
    pub opted_in_date: NaiveDate,
    /// True when the user had already opted in today; the call is a no-op.
    pub already_opted_in: bool,
}
