//! Core Module - infrastructural components.
//!
//! - Authentication (JWT verification middleware)
//! - Configuration
//! - Error handling
//! - Application state

pub mod auth;
pub mod config;
pub mod error;
pub mod state;

// Re-exports to keep imports short
pub use auth::{AuthUser, Claims, authentication_middleware, decode_jwt, encode_jwt};
pub use config::Config;
pub use error::AppError;
pub use state::AppState;
