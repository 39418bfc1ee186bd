//! User entity - directory record keyed by the external auth uid.

use super::enums::SolvingTime;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Opaque stable identifier issued by the external identity provider.
    pub uid: String,
    pub username: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub preferred_language: Option<String>,
    pub preferred_solving_time: Option<SolvingTime>,
    pub dsa_sheet: Option<String>,
    /// Date of the last "start today" opt-in; a value equal to the current
    /// day means the user is in today's matching queue.
    pub opted_in_date: Option<NaiveDate>,
    pub partner_uid: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn opted_in_on(&self, day: NaiveDate) -> bool {
        self.opted_in_date == Some(day)
    }

    /// Matching requires both compatibility attributes to be filled in.
    pub fn matching_profile(&self) -> Option<(&str, SolvingTime)> {
        match (&self.preferred_language, self.preferred_solving_time) {
            (Some(lang), Some(time)) => Some((lang.as_str(), time)),
            _ => None,
        }
    }
}
