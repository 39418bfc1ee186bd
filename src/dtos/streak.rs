//! Streak DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StreakDTO {
    pub streak_count: i64,
    /// True when the pair had already checked in today; the count is
    /// returned unchanged.
    pub already_updated_today: bool,
    pub last_increment_date: Option<NaiveDate>,
}
