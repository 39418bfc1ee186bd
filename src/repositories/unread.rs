//! UnreadRepository - badge marks per (owner, other user) pair.
//!
//! Marks are a heuristic for notification badges, not a delivery
//! guarantee: setting and clearing are both idempotent single
//! statements.

use super::Delete;
use crate::entities::UnreadMark;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

pub struct UnreadRepository {
    connection_pool: SqlitePool,
}

impl UnreadRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Flag the conversation with `other_uid` as unread for `owner_uid`.
    /// A second message before mark-read leaves the existing mark alone.
    pub async fn mark(&self, owner_uid: &str, other_uid: &str) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO unread_marks (owner_uid, other_uid, marked_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(owner_uid)
        .bind(other_uid)
        .bind(Utc::now())
        .execute(&self.connection_pool)
        .await?;

        Ok(())
    }

    /// Uids with unseen messages for this owner, used to render badges.
    pub async fn find_many_by_owner(&self, owner_uid: &str) -> Result<Vec<UnreadMark>, Error> {
        let marks = sqlx::query_as::<_, UnreadMark>(
            "SELECT * FROM unread_marks WHERE owner_uid = ? ORDER BY marked_at DESC",
        )
        .bind(owner_uid)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(marks)
    }
}

impl Delete<(String, String)> for UnreadRepository {
    /// Mark-read. Idempotent: clearing an absent mark is a no-op.
    async fn delete(&self, id: &(String, String)) -> Result<(), Error> {
        sqlx::query("DELETE FROM unread_marks WHERE owner_uid = ? AND other_uid = ?")
            .bind(&id.0)
            .bind(&id.1)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}
