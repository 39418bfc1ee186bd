//! User services - directory registration and profile management.
//!
//! Identity comes from the external auth provider; registration binds
//! the verified uid to a directory record with profile fields.

use crate::core::{AppError, AppState, AuthUser};
use crate::dtos::{CreateUserDTO, RegisterUserDTO, UpdateUserDTO, UserDTO};
use crate::repositories::{Create, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, body), fields(uid = %auth.uid))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<RegisterUserDTO>,
) -> Result<(StatusCode, Json<UserDTO>), AppError> {
    body.validate()?;

    if state.user.read(&auth.uid).await?.is_some() {
        warn!("Registration attempted for an existing uid");
        return Err(AppError::conflict("User already exists"));
    }

    let user = state
        .user
        .create(&CreateUserDTO {
            uid: auth.uid.clone(),
            username: body.username,
            email: body.email,
        })
        .await?;

    info!("User registered");
    Ok((StatusCode::CREATED, Json(UserDTO::from(user))))
}

#[instrument(skip(state), fields(uid = %auth.uid))]
pub async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserDTO>, AppError> {
    let user = state
        .user
        .read(&auth.uid)
        .await?
        .ok_or_else(|| AppError::not_found("User not registered"))?;

    Ok(Json(UserDTO::from(user)))
}

#[instrument(skip(state, body), fields(uid = %auth.uid))]
pub async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<UpdateUserDTO>,
) -> Result<Json<UserDTO>, AppError> {
    body.validate()?;

    debug!("Applying profile update");
    let user = state.user.update(&auth.uid, &body).await?;

    Ok(Json(UserDTO::from(user)))
}

#[instrument(skip(state), fields(uid = %uid))]
pub async fn get_user_by_uid(
    State(state): State<Arc<AppState>>,
    Path(uid): Path<String>,
) -> Result<Json<UserDTO>, AppError> {
    let user = state
        .user
        .read(&uid)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    Ok(Json(UserDTO::from(user)))
}
