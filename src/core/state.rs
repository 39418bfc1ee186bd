//! Application State - shared state behind every route and middleware.

use crate::repositories::{
    MatchRequestRepository, MessageRepository, StreakRepository, UnreadRepository, UserRepository,
};
use crate::services::matching::SwipeSkips;
use crate::ws::convmap::ConversationMap;
use crate::ws::presence::PresenceMap;
use sqlx::SqlitePool;

pub struct AppState {
    /// User directory (profiles, matching and partner state)
    pub user: UserRepository,

    /// Append-only message store
    pub msg: MessageRepository,

    /// Unread badge marks
    pub unread: UnreadRepository,

    /// Pending swipe-right interests
    pub requests: MatchRequestRepository,

    /// Per-pair streak records
    pub streak: StreakRepository,

    /// Secret for verifying bearer tokens
    pub jwt_secret: String,

    /// Live relay sessions by uid, with the advisory "viewing" hint
    pub presence: PresenceMap,

    /// Broadcast channel per conversation with at least one subscriber
    pub conversations: ConversationMap,

    /// Ephemeral per-day swipe-left exclusions
    pub swipe_skips: SwipeSkips,
}

impl AppState {
    /// Build the state from a connection pool and the JWT secret; all
    /// repositories share the pool.
    pub fn new(pool: SqlitePool, jwt_secret: String) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            msg: MessageRepository::new(pool.clone()),
            unread: UnreadRepository::new(pool.clone()),
            requests: MatchRequestRepository::new(pool.clone()),
            streak: StreakRepository::new(pool),
            jwt_secret,
            presence: PresenceMap::new(),
            conversations: ConversationMap::new(),
            swipe_skips: SwipeSkips::new(),
        }
    }
}
