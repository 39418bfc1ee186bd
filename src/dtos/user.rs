//! User DTOs - profile registration, edits, and the public projection.

use crate::entities::{SolvingTime, User};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    /// Shape of an external auth uid: the identity provider hands these
    /// out as short URL-safe tokens.
    static ref UID_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap();
}

/// True when `uid` looks like a well-formed external identity.
pub fn validate_uid(uid: &str) -> bool {
    UID_RE.is_match(uid)
}

/// Public projection of a directory record; email stays server-side.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UserDTO {
    pub uid: String,
    pub username: String,
    pub avatar_url: Option<String>,
    pub preferred_language: Option<String>,
    pub preferred_solving_time: Option<SolvingTime>,
    pub dsa_sheet: Option<String>,
    pub partner_uid: Option<String>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            uid: value.uid,
            username: value.username,
            avatar_url: value.avatar_url,
            preferred_language: value.preferred_language,
            preferred_solving_time: value.preferred_solving_time,
            dsa_sheet: value.dsa_sheet,
            partner_uid: value.partner_uid,
        }
    }
}

/// Body for POST /users - registers the authenticated uid.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct RegisterUserDTO {
    #[validate(length(min = 1, max = 64, message = "Username must be between 1 and 64 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Internal creation shape handed to the repository: the verified uid
/// plus the validated registration body.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateUserDTO {
    pub uid: String,
    pub username: String,
    pub email: String,
}

/// Body for PATCH /users/me - only `Some(_)` fields are applied.
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
pub struct UpdateUserDTO {
    #[validate(length(min = 1, max = 64, message = "Username must be between 1 and 64 characters"))]
    pub username: Option<String>,

    #[validate(url(message = "Avatar must be a valid URL"))]
    pub avatar_url: Option<String>,

    #[validate(length(min = 1, max = 32, message = "Language must be between 1 and 32 characters"))]
    pub preferred_language: Option<String>,

    pub preferred_solving_time: Option<SolvingTime>,

    #[validate(length(min = 1, max = 64, message = "Sheet name must be between 1 and 64 characters"))]
    pub dsa_sheet: Option<String>,
}
