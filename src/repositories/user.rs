//! UserRepository - directory records and matching state.

use super::{Create, Read, Update};
use crate::dtos::user::{CreateUserDTO, UpdateUserDTO};
use crate::entities::{SolvingTime, User};
use chrono::{NaiveDate, Utc};
use sqlx::{Error, SqlitePool};

pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Record the daily opt-in. Idempotent per day: re-running with the
    /// same date leaves the row untouched and reports `false`.
    ///
    /// Returns `true` when the opt-in was newly applied today.
    pub async fn opt_in(&self, uid: &str, today: NaiveDate) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET opted_in_date = ?
            WHERE uid = ? AND (opted_in_date IS NULL OR opted_in_date <> ?)
            "#,
        )
        .bind(today)
        .bind(uid)
        .bind(today)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Today's matching queue for a requester with the given
    /// compatibility attributes: opted in today, not the requester, not
    /// already partnered, exact match on language and solving time.
    pub async fn find_candidates(
        &self,
        requester_uid: &str,
        language: &str,
        solving_time: SolvingTime,
        today: NaiveDate,
    ) -> Result<Vec<User>, Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT * FROM users
            WHERE opted_in_date = ?
              AND uid <> ?
              AND partner_uid IS NULL
              AND preferred_language = ?
              AND preferred_solving_time = ?
            ORDER BY uid ASC
            "#,
        )
        .bind(today)
        .bind(requester_uid)
        .bind(language)
        .bind(solving_time)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(users)
    }

    /// Compare-and-set half of a partnership. The guard accepts either an
    /// unpartnered row or one already pointing at `partner_uid`, so the
    /// two sides of a mutual swipe can apply their halves in any order
    /// without stepping on each other.
    ///
    /// Returns `false` when the row is partnered with someone else (the
    /// caller lost the race and must undo its own half).
    pub async fn set_partner_guarded(&self, uid: &str, partner_uid: &str) -> Result<bool, Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET partner_uid = ?1
            WHERE uid = ?2 AND (partner_uid IS NULL OR partner_uid = ?1)
            "#,
        )
        .bind(partner_uid)
        .bind(uid)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Undo one half of a failed partnership attempt. Guarded so it can
    /// never detach a partnership formed by a competing swipe.
    pub async fn clear_partner_if(&self, uid: &str, partner_uid: &str) -> Result<(), Error> {
        sqlx::query("UPDATE users SET partner_uid = NULL WHERE uid = ? AND partner_uid = ?")
            .bind(uid)
            .bind(partner_uid)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (uid, username, email, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&data.uid)
        .bind(&data.username)
        .bind(&data.email)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(User {
            uid: data.uid.clone(),
            username: data.username.clone(),
            email: data.email.clone(),
            avatar_url: None,
            preferred_language: None,
            preferred_solving_time: None,
            dsa_sheet: None,
            opted_in_date: None,
            partner_uid: None,
            created_at: now,
        })
    }
}

impl Read<User, String> for UserRepository {
    async fn read(&self, id: &String) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE uid = ?")
            .bind(id)
            .fetch_optional(&self.connection_pool)
            .await?;

        Ok(user)
    }
}

impl Update<User, UpdateUserDTO, String> for UserRepository {
    async fn update(&self, id: &String, data: &UpdateUserDTO) -> Result<User, Error> {
        let current = self.read(id).await?.ok_or(Error::RowNotFound)?;

        sqlx::query(
            r#"
            UPDATE users
            SET username = ?,
                avatar_url = ?,
                preferred_language = ?,
                preferred_solving_time = ?,
                dsa_sheet = ?
            WHERE uid = ?
            "#,
        )
        .bind(data.username.as_ref().unwrap_or(&current.username))
        .bind(data.avatar_url.as_ref().or(current.avatar_url.as_ref()))
        .bind(
            data.preferred_language
                .as_ref()
                .or(current.preferred_language.as_ref()),
        )
        .bind(data.preferred_solving_time.or(current.preferred_solving_time))
        .bind(data.dsa_sheet.as_ref().or(current.dsa_sheet.as_ref()))
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}
