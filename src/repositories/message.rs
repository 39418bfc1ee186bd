//! MessageRepository - append-only direct-message store.
//!
//! Messages are never updated or deleted once appended. Conversation
//! order is `created_at ASC` with `message_id` (insertion order) as the
//! tie break; since both are monotonic the id alone drives pagination.

use super::{Create, Read};
use crate::dtos::CreateMessageDTO;
use crate::entities::Message;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

pub struct MessageRepository {
    connection_pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// One page of the conversation between `user_a` and `user_b`
    /// (unordered pair), ascending. `before` is an exclusive message-id
    /// cursor: only messages older than it are returned, so a client can
    /// walk backwards through history page by page.
    pub async fn find_conversation_page(
        &self,
        user_a: &str,
        user_b: &str,
        before: Option<i64>,
        limit: i64,
    ) -> Result<Vec<Message>, Error> {
        // Fetch the newest `limit` rows below the cursor, then restore
        // ascending order in memory.
        let mut messages = if let Some(before_id) = before {
            sqlx::query_as::<_, Message>(
                r#"
                SELECT * FROM messages
                WHERE ((sender_uid = ?1 AND receiver_uid = ?2)
                    OR (sender_uid = ?2 AND receiver_uid = ?1))
                  AND message_id < ?3
                ORDER BY message_id DESC
                LIMIT ?4
                "#,
            )
            .bind(user_a)
            .bind(user_b)
            .bind(before_id)
            .bind(limit)
            .fetch_all(&self.connection_pool)
            .await?
        } else {
            sqlx::query_as::<_, Message>(
                r#"
                SELECT * FROM messages
                WHERE (sender_uid = ?1 AND receiver_uid = ?2)
                   OR (sender_uid = ?2 AND receiver_uid = ?1)
                ORDER BY message_id DESC
                LIMIT ?3
                "#,
            )
            .bind(user_a)
            .bind(user_b)
            .bind(limit)
            .fetch_all(&self.connection_pool)
            .await?
        };

        messages.reverse();
        Ok(messages)
    }

    /// Distinct uids this user has exchanged messages with, most recent
    /// conversation first.
    pub async fn find_conversation_peers(&self, uid: &str) -> Result<Vec<String>, Error> {
        let peers = sqlx::query_scalar::<_, String>(
            r#"
            SELECT peer FROM (
                SELECT CASE WHEN sender_uid = ?1 THEN receiver_uid ELSE sender_uid END AS peer,
                       MAX(message_id) AS last_id
                FROM messages
                WHERE sender_uid = ?1 OR receiver_uid = ?1
                GROUP BY peer
            )
            ORDER BY last_id DESC
            "#,
        )
        .bind(uid)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(peers)
    }
}

impl Create<Message, CreateMessageDTO> for MessageRepository {
    /// Durably persists the message; fan-out happens only after this
    /// returns, so a crash mid-delivery never loses data.
    async fn create(&self, data: &CreateMessageDTO) -> Result<Message, Error> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            INSERT INTO messages (sender_uid, receiver_uid, body, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&data.sender_uid)
        .bind(&data.receiver_uid)
        .bind(&data.body)
        .bind(now)
        .execute(&self.connection_pool)
        .await?;

        Ok(Message {
            message_id: result.last_insert_rowid(),
            sender_uid: data.sender_uid.clone(),
            receiver_uid: data.receiver_uid.clone(),
            body: data.body.clone(),
            created_at: now,
        })
    }
}

impl Read<Message, i64> for MessageRepository {
    async fn read(&self, id: &i64) -> Result<Option<Message>, Error> {
        let message =
            sqlx::query_as::<_, Message>("SELECT * FROM messages WHERE message_id = ?")
                .bind(id)
                .fetch_optional(&self.connection_pool)
                .await?;

        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::Create;
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn append_then_page(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        for body in ["one", "two", "three"] {
            repo.create(&CreateMessageDTO {
                sender_uid: "uid-alice".into(),
                receiver_uid: "uid-bob".into(),
                body: body.into(),
            })
            .await?;
        }

        let page = repo
            .find_conversation_page("uid-bob", "uid-alice", None, 50)
            .await?;
        assert_eq!(
            page.iter().map(|m| m.body.as_str()).collect::<Vec<_>>(),
            vec!["one", "two", "three"]
        );
        assert!(page.windows(2).all(|w| w[0].message_id < w[1].message_id));

        // Exclusive cursor: everything strictly older than the last id.
        let older = repo
            .find_conversation_page("uid-alice", "uid-bob", Some(page[2].message_id), 50)
            .await?;
        assert_eq!(older.len(), 2);
        assert_eq!(older.last().unwrap().body, "two");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn peers_most_recent_first(pool: SqlitePool) -> sqlx::Result<()> {
        let repo = MessageRepository::new(pool);

        repo.create(&CreateMessageDTO {
            sender_uid: "uid-alice".into(),
            receiver_uid: "uid-bob".into(),
            body: "to bob".into(),
        })
        .await?;
        repo.create(&CreateMessageDTO {
            sender_uid: "uid-carol".into(),
            receiver_uid: "uid-alice".into(),
            body: "from carol".into(),
        })
        .await?;

        let peers = repo.find_conversation_peers("uid-alice").await?;
        assert_eq!(peers, vec!["uid-carol".to_string(), "uid-bob".to_string()]);

        Ok(())
    }
}
