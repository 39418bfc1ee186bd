//! Repositories module - database access, one repository per aggregate.
//!
//! All queries go through the runtime sqlx API against the shared
//! SQLite pool. Single-statement writes are the atomicity unit: the
//! guarded UPDATEs in [`user::UserRepository`] and
//! [`streak::StreakRepository`] are the compare-and-set operations the
//! matching and streak flows rely on.

pub mod match_request;
pub mod message;
pub mod streak;
pub mod traits;
pub mod unread;
pub mod user;

// Re-exports to keep imports short
pub use traits::{Create, Delete, Read, Update};

pub use match_request::MatchRequestRepository;
pub use message::MessageRepository;
pub use streak::StreakRepository;
pub use unread::UnreadRepository;
pub use user::UserRepository;
