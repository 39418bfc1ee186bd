//! PairStreak entity - daily engagement counter shared by a partner pair.
//!
//! Stored once per pair (keyed by the canonical unordered pair), so the
//! count both partners see is the same row no matter who checks in.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct PairStreak {
    pub pair_key: String,
    pub streak_count: i64,
    pub last_increment_date: Option<NaiveDate>,
}
