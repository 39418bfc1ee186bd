//! MatchRequestRepository - pending swipe-right interests.

use crate::entities::MatchRequest;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

pub struct MatchRequestRepository {
    connection_pool: SqlitePool,
}

impl MatchRequestRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Record a one-directional interest. Swiping right twice on the
    /// same candidate is a no-op.
    pub async fn record_interest(&self, from_uid: &str, to_uid: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO match_requests (from_uid, to_uid, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(from_uid)
        .bind(to_uid)
        .bind(Utc::now())
        .execute(&self.connection_pool)
        .await?;

        Ok(())
    }

    pub async fn find_interest(
        &self,
        from_uid: &str,
        to_uid: &str,
    ) -> Result<Option<MatchRequest>, Error> {
        let request = sqlx::query_as::<_, MatchRequest>(
            "SELECT * FROM match_requests WHERE from_uid = ? AND to_uid = ?",
        )
        .bind(from_uid)
        .bind(to_uid)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(request)
    }

    /// Clear both directions once a partnership has formed.
    pub async fn delete_pair(&self, user_a: &str, user_b: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            DELETE FROM match_requests
            WHERE (from_uid = ?1 AND to_uid = ?2) OR (from_uid = ?2 AND to_uid = ?1)
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .execute(&self.connection_pool)
        .await?;

        Ok(())
    }
}
