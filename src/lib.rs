//! CodeBuddy server library - exposes the router and modules for
//! integration tests.

pub mod core;
pub mod dtos;
pub mod entities;
pub mod repositories;
pub mod services;
pub mod ws;

// Re-export the main types to keep imports short
pub use core::{AppError, AppState, auth, config};
pub use services::root;

use axum::{
    Router, middleware,
    routing::{any, get, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Build the application router.
pub fn create_router(state: Arc<AppState>) -> Router {
    use core::authentication_middleware;
    use ws::ws_handler;

    Router::new()
        .route("/", get(root))
        .route("/health", get(root))
        .nest("/users", configure_user_routes(state.clone()))
        .nest("/conversations", configure_conversation_routes(state.clone()))
        .nest("/matching", configure_matching_routes(state.clone()))
        .route(
            "/unread",
            get(services::list_unread).layer(middleware::from_fn_with_state(
                state.clone(),
                authentication_middleware,
            )),
        )
        .route(
            "/streak/check-in",
            post(services::check_in).layer(middleware::from_fn_with_state(
                state.clone(),
                authentication_middleware,
            )),
        )
        .route(
            "/ws",
            any(ws_handler).layer(middleware::from_fn_with_state(
                state.clone(),
                authentication_middleware,
            )),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Directory routes: registration and profiles.
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", post(register_user))
        .route("/me", get(get_me).patch(update_me))
        .route("/{uid}", get(get_user_by_uid))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Conversation routes: history, sending, read state.
fn configure_conversation_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/", get(list_peers))
        .route(
            "/{peer_uid}/messages",
            get(list_conversation).post(send_message),
        )
        .route("/{peer_uid}/read", post(mark_read))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Matching routes: daily opt-in, candidate queue, swipes.
fn configure_matching_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use core::authentication_middleware;
    use services::*;

    Router::new()
        .route("/opt-in", post(opt_in))
        .route("/candidates", get(list_candidates))
        .route("/swipe", post(swipe))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
