//! Services module - HTTP handlers, one sub-module per feature.

pub mod matching;
pub mod messages;
pub mod streak;
pub mod users;

// Re-exports to keep imports short
pub use matching::{list_candidates, opt_in, swipe};
pub use messages::{list_conversation, list_peers, list_unread, mark_read, send_message};
pub use streak::check_in;
pub use users::{get_me, get_user_by_uid, register_user, update_me};

use axum::{http::StatusCode, response::IntoResponse};
use chrono::{NaiveDate, Utc};

/// Root endpoint - health check
pub async fn root() -> impl IntoResponse {
    (StatusCode::OK, "Server is running")
}

/// The current calendar day, server-side UTC. Day boundaries are a pure
/// function of wall clock time; there is no scheduled expiry sweep.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}
