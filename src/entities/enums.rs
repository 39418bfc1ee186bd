//! Shared enums stored as TEXT columns.

use serde::{Deserialize, Serialize};

/// Preferred time of day for solving problems; matching filters on exact
/// equality of this attribute.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SolvingTime {
    Morning,
    Afternoon,
    Evening,
    Night,
}
