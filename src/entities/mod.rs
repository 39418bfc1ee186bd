//! Entities module - domain entities persisted in the database.
//!
//! One entity per table, plus the [`ConversationKey`] value type used to
//! address the unordered pair of users behind a conversation.

pub mod conversation;
pub mod enums;
pub mod match_request;
pub mod message;
pub mod pair_streak;
pub mod unread_mark;
pub mod user;

// Re-exports to keep imports short
pub use conversation::ConversationKey;
pub use enums::SolvingTime;
pub use match_request::MatchRequest;
pub use message::Message;
pub use pair_streak::PairStreak;
pub use unread_mark::UnreadMark;
pub use user::User;
