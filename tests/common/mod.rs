use axum_test::TestServer;
use codebuddy_server::core::AppState;
use sqlx::SqlitePool;
use std::sync::Arc;

pub const TEST_JWT_SECRET: &str = "codebuddy-test-secret";

/// Build an AppState over the per-test database pool.
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    Arc::new(AppState::new(pool, TEST_JWT_SECRET.to_string()))
}

/// Build a TestServer running the full router in-process.
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = codebuddy_server::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// A bearer token for `uid`, as the external identity provider would
/// issue it.
pub fn create_test_jwt(uid: &str) -> String {
    codebuddy_server::core::auth::encode_jwt(uid, TEST_JWT_SECRET)
        .expect("Failed to create JWT token")
}

/// "Authorization: Bearer ..." value for `uid`.
pub fn bearer(uid: &str) -> String {
    format!("Bearer {}", create_test_jwt(uid))
}
