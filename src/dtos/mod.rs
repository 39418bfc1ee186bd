//! DTOs module - request/response shapes exchanged with clients.
//!
//! Entities never cross the API boundary directly; every response goes
//! through a DTO with an explicit `From<Entity>` conversion.

pub mod matching;
pub mod message;
pub mod query;
pub mod streak;
pub mod user;
pub mod ws_event;

// Re-exports to keep imports short
pub use matching::{MatchCandidateDTO, OptInResultDTO, SwipeDTO, SwipeDirection, SwipeResultDTO};
pub use message::{CreateMessageDTO, MessageDTO, SendMessageDTO};
pub use query::MessagesQuery;
pub use streak::StreakDTO;
pub use user::{CreateUserDTO, RegisterUserDTO, UpdateUserDTO, UserDTO, validate_uid};
pub use ws_event::{ClientEvent, ServerEvent};
