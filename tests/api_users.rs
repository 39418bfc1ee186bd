//! Integration tests for the user directory endpoints.

mod common;

#[cfg(test)]
mod user_tests {
    use super::common::*;
    use axum_test::http::HeaderName;
    use serde_json::json;
    use sqlx::SqlitePool;

    #[sqlx::test]
    async fn register_then_fetch_me(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/users")
            .add_header(HeaderName::from_static("authorization"), bearer("uid-new"))
            .json(&json!({ "username": "newbie", "email": "newbie@example.com" }))
            .await;

        response.assert_status(axum_test::http::StatusCode::CREATED);
        let user: serde_json::Value = response.json();
        assert_eq!(user["uid"], "uid-new");
        assert_eq!(user["username"], "newbie");

        let me: serde_json::Value = server
            .get("/users/me")
            .add_header(HeaderName::from_static("authorization"), bearer("uid-new"))
            .await
            .json();
        assert_eq!(me["uid"], "uid-new");
        assert!(me["partner_uid"].is_null());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn register_twice_conflicts(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/users")
            .add_header(HeaderName::from_static("authorization"), bearer("uid-alice"))
            .json(&json!({ "username": "alice2", "email": "alice2@example.com" }))
            .await;

        response.assert_status_conflict();
        Ok(())
    }

    #[sqlx::test]
    async fn register_rejects_bad_email(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .post("/users")
            .add_header(HeaderName::from_static("authorization"), bearer("uid-new"))
            .json(&json!({ "username": "newbie", "email": "not-an-email" }))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn requests_without_token_are_rejected(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        server.get("/users/me").await.assert_status_forbidden();

        let response = server
            .get("/users/me")
            .add_header(
                HeaderName::from_static("authorization"),
                "Bearer not-a-token",
            )
            .await;
        response.assert_status_unauthorized();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn profile_update_sets_matching_attributes(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .patch("/users/me")
            .add_header(HeaderName::from_static("authorization"), bearer("uid-frank"))
            .json(&json!({
                "preferred_language": "rust",
                "preferred_solving_time": "evening",
                "dsa_sheet": "neetcode-150"
            }))
            .await;

        response.assert_status_ok();
        let user: serde_json::Value = response.json();
        assert_eq!(user["preferred_language"], "rust");
        assert_eq!(user["preferred_solving_time"], "evening");
        // Untouched fields survive the partial update.
        assert_eq!(user["username"], "frank");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn public_profile_lookup(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let response = server
            .get("/users/uid-bob")
            .add_header(HeaderName::from_static("authorization"), bearer("uid-alice"))
            .await;
        response.assert_status_ok();
        let user: serde_json::Value = response.json();
        assert_eq!(user["username"], "bob");
        // Email never leaves the server.
        assert!(user.get("email").is_none());

        let missing = server
            .get("/users/uid-nobody")
            .add_header(HeaderName::from_static("authorization"), bearer("uid-alice"))
            .await;
        missing.assert_status_not_found();

        Ok(())
    }
}
