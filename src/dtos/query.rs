//! Query DTOs - pagination parameters.

use serde::{Deserialize, Serialize};

/// Query parameters for conversation history pagination.
///
/// `before` is an exclusive message-id cursor: pass the smallest id of
/// the previous page to walk backwards through history without
/// re-scanning it.
#[derive(Serialize, Deserialize, Debug, Default)]
pub struct MessagesQuery {
    #[serde(default)]
    pub before: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}
