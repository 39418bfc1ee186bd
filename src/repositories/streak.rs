//! StreakRepository - the shared per-pair daily counter.
//!
//! The increment is one guarded UPDATE: the date predicate makes a
//! same-day repeat (from either partner, including two concurrent
//! check-ins) a no-op, and single-statement atomicity means the count
//! can never be bumped twice for one calendar day.

use super::Read;
use crate::entities::PairStreak;
use chrono::NaiveDate;
use sqlx::{Error, SqlitePool};

pub struct StreakRepository {
    connection_pool: SqlitePool,
}

impl StreakRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Ensure the pair record exists; called when a partnership forms.
    pub async fn seed(&self, pair_key: &str) -> Result<(), Error> {
        sqlx::query("INSERT OR IGNORE INTO pair_streaks (pair_key, streak_count) VALUES (?, 0)")
            .bind(pair_key)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }

    /// Bump the counter for `today` unless it already ran today.
    /// Returns `true` when this call performed the increment.
    pub async fn try_increment(&self, pair_key: &str, today: NaiveDate) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE pair_streaks
            SET streak_count = streak_count + 1,
                last_increment_date = ?1
            WHERE pair_key = ?2
              AND (last_increment_date IS NULL OR last_increment_date < ?1)
            "#,
        )
        .bind(today)
        .bind(pair_key)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

impl Read<PairStreak, String> for StreakRepository {
    async fn read(&self, id: &String) -> Result<Option<PairStreak>, Error> {
        let streak =
            sqlx::query_as::<_, PairStreak>("SELECT * FROM pair_streaks WHERE pair_key = ?")
                .bind(id)
                .fetch_optional(&self.connection_pool)
                .await?;

        Ok(streak)
    }
}
