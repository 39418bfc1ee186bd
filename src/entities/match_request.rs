//! MatchRequest entity - a one-directional swipe-right interest.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct MatchRequest {
    pub from_uid: String,
    pub to_uid: String,
    pub created_at: DateTime<Utc>,
}
