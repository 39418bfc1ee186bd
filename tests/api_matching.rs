//! Integration tests for the daily matching queue and swipe flow.

mod common;

#[cfg(test)]
mod matching_tests {
    use super::common::*;
    use axum_test::TestServer;
    use axum_test::http::HeaderName;
    use serde_json::json;
    use sqlx::SqlitePool;

    async fn opt_in(server: &TestServer, uid: &str) -> serde_json::Value {
        let response = server
            .post("/matching/opt-in")
            .add_header(HeaderName::from_static("authorization"), bearer(uid))
            .await;
        response.assert_status_ok();
        response.json()
    }

    async fn candidates(server: &TestServer, uid: &str) -> Vec<String> {
        let list: Vec<serde_json::Value> = server
            .get("/matching/candidates")
            .add_header(HeaderName::from_static("authorization"), bearer(uid))
            .await
            .json();
        list.into_iter()
            .map(|c| c["uid"].as_str().unwrap().to_string())
            .collect()
    }

    async fn swipe(server: &TestServer, uid: &str, candidate: &str, direction: &str) -> axum_test::TestResponse {
        server
            .post("/matching/swipe")
            .add_header(HeaderName::from_static("authorization"), bearer(uid))
            .json(&json!({ "candidate_uid": candidate, "direction": direction }))
            .await
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn opt_in_is_idempotent_per_day(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        let first = opt_in(&server, "uid-alice").await;
        assert_eq!(first["already_opted_in"], false);

        let second = opt_in(&server, "uid-alice").await;
        assert_eq!(second["already_opted_in"], true);
        assert_eq!(second["opted_in_date"], first["opted_in_date"]);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "partners")))]
    async fn candidates_filter_on_compatibility(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        for uid in ["uid-alice", "uid-bob", "uid-carol", "uid-dave"] {
            opt_in(&server, uid).await;
        }

        // Same language and solving time as alice, unpartnered, opted in
        // today: only bob. carol prefers python/morning, dave is already
        // partnered, gina never opted in.
        assert_eq!(candidates(&server, "uid-alice").await, vec!["uid-bob"]);

        // Partnered callers get an empty queue even after opting in.
        assert!(candidates(&server, "uid-dave").await.is_empty());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn candidates_require_a_complete_profile(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        opt_in(&server, "uid-frank").await;
        server
            .get("/matching/candidates")
            .add_header(HeaderName::from_static("authorization"), bearer("uid-frank"))
            .await
            .assert_status_bad_request();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn swipe_left_trims_the_deck(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        for uid in ["uid-alice", "uid-bob", "uid-gina"] {
            opt_in(&server, uid).await;
        }
        assert_eq!(
            candidates(&server, "uid-alice").await,
            vec!["uid-bob", "uid-gina"]
        );

        let response = swipe(&server, "uid-alice", "uid-bob", "left").await;
        response.assert_status_ok();
        let result: serde_json::Value = response.json();
        assert_eq!(result["matched"], false);

        assert_eq!(candidates(&server, "uid-alice").await, vec!["uid-gina"]);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn mutual_right_swipes_form_a_partnership(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        for uid in ["uid-alice", "uid-bob", "uid-gina"] {
            opt_in(&server, uid).await;
        }

        // First side records interest, nothing visible happens yet.
        let pending: serde_json::Value = swipe(&server, "uid-alice", "uid-bob", "right").await.json();
        assert_eq!(pending["matched"], false);
        assert!(pending["partner_uid"].is_null());

        // The reverse swipe completes the pair.
        let matched: serde_json::Value = swipe(&server, "uid-bob", "uid-alice", "right").await.json();
        assert_eq!(matched["matched"], true);
        assert_eq!(matched["partner_uid"], "uid-alice");

        let me: serde_json::Value = server
            .get("/users/me")
            .add_header(HeaderName::from_static("authorization"), bearer("uid-alice"))
            .await
            .json();
        assert_eq!(me["partner_uid"], "uid-bob");

        // Both leave the queue; gina no longer sees either of them.
        assert!(candidates(&server, "uid-alice").await.is_empty());
        assert!(candidates(&server, "uid-gina").await.is_empty());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn repeating_the_matching_swipe_is_a_noop(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        opt_in(&server, "uid-alice").await;
        opt_in(&server, "uid-bob").await;
        swipe(&server, "uid-alice", "uid-bob", "right").await.assert_status_ok();
        swipe(&server, "uid-bob", "uid-alice", "right").await.assert_status_ok();

        let repeat: serde_json::Value = swipe(&server, "uid-bob", "uid-alice", "right").await.json();
        assert_eq!(repeat["matched"], true);
        assert_eq!(repeat["partner_uid"], "uid-alice");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "partners")))]
    async fn swiping_a_partnered_candidate_conflicts(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        opt_in(&server, "uid-alice").await;
        swipe(&server, "uid-alice", "uid-dave", "right")
            .await
            .assert_status_conflict();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn swiping_yourself_is_rejected(pool: SqlitePool) -> sqlx::Result<()> {
        let server = create_test_server(create_test_state(pool));

        swipe(&server, "uid-alice", "uid-alice", "right")
            .await
            .assert_status_bad_request();

        Ok(())
    }

    /// Two mutual swipes raced against each other must converge on
    /// exactly one consistent partnership, whatever the interleaving.
    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn concurrent_mutual_swipes_converge(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state);

        opt_in(&server, "uid-alice").await;
        opt_in(&server, "uid-bob").await;

        let (a, b) = tokio::join!(
            swipe(&server, "uid-alice", "uid-bob", "right"),
            swipe(&server, "uid-bob", "uid-alice", "right"),
        );
        a.assert_status_ok();
        b.assert_status_ok();

        let result_a: serde_json::Value = a.json();
        let result_b: serde_json::Value = b.json();
        // At least one side observes the formed partnership.
        assert!(
            result_a["matched"] == true || result_b["matched"] == true,
            "no side reported a match: {result_a} / {result_b}"
        );

        // The persisted rows point at each other either way.
        for (uid, expected) in [("uid-alice", "uid-bob"), ("uid-bob", "uid-alice")] {
            let me: serde_json::Value = server
                .get("/users/me")
                .add_header(HeaderName::from_static("authorization"), bearer(uid))
                .await
                .json();
            assert_eq!(me["partner_uid"], expected);
        }

        Ok(())
    }
}
