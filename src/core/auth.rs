//! JWT verification - ties every request and relay connection to a
//! verified identity.
//!
//! Tokens are issued by the external identity collaborator; this server
//! only verifies the signature with the shared secret and extracts the
//! uid from the `sub` claim. Handlers never read identity from anywhere
//! else, so a client cannot claim another user's uid on a channel join.

use crate::core::{AppError, AppState};
use crate::dtos::validate_uid;
use axum::extract::State;
use axum::{body::Body, extract::Request, http, http::Response, middleware::Next};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Contents of a verified token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: usize,
    pub iat: usize,
    /// The opaque external user id.
    pub sub: String,
}

/// The verified identity of the current request, inserted as a request
/// extension by [`authentication_middleware`].
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
}

/// Issue a token for `uid`; used by the test harness and local tooling
/// (production tokens come from the identity provider).
pub fn encode_jwt(uid: &str, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(24)).timestamp() as usize,
        sub: uid.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
}

pub fn decode_jwt(
    jwt_token: &str,
    secret: &str,
) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
    decode(
        jwt_token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )
}

/// Bearer-token middleware. On success the request carries an
/// [`AuthUser`] extension; handlers that need the directory record
/// fetch it themselves (registration happens after the first
/// authenticated call, so the row may legitimately not exist yet).
#[instrument(skip(state, req, next))]
pub async fn authentication_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    let auth_header = match req.headers().get(http::header::AUTHORIZATION) {
        Some(header) => header.to_str().map_err(|_| {
            warn!("Invalid authorization header format");
            AppError::forbidden("Empty header is not allowed")
        })?,
        None => {
            warn!("Missing authorization header");
            return Err(AppError::forbidden("Please add the JWT token to the header"));
        }
    };

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::forbidden("Expected a Bearer token"))?;

    let token_data = decode_jwt(token, &state.jwt_secret).map_err(|_| {
        warn!("Failed to decode JWT token");
        AppError::unauthorized("Unable to decode token")
    })?;

    let uid = token_data.claims.sub;
    if !validate_uid(&uid) {
        warn!("Token subject is not a well-formed uid");
        return Err(AppError::unauthorized("Malformed token subject"));
    }

    debug!(%uid, "Request authenticated");
    req.extensions_mut().insert(AuthUser { uid });
    Ok(next.run(req).await)
}
