//! MessageRepository - Gateway sqlx/MySQL per i messaggi di assistenza

use super::MessageStore;
use crate::dtos::NewMessageDTO;
use crate::entities::ChatMessage;
use chrono::{DateTime, Utc};
use sqlx::{Error, MySqlPool};

// MESSAGE REPO
pub struct MessageRepository {
    connection_pool: MySqlPool,
}

impl MessageRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }
}

impl MessageStore for MessageRepository {
    async fn append(&self, data: &NewMessageDTO) -> Result<ChatMessage, Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO support_messages (sender_id, recipient_id, content, sent_at, from_support, is_read)
            VALUES (?, ?, ?, ?, ?, FALSE)
            "#,
        )
        .bind(data.sender_id)
        .bind(data.recipient_id)
        .bind(&data.content)
        .bind(data.sent_at)
        .bind(data.from_support)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;

        // Return the created message with the new ID
        Ok(ChatMessage {
            message_id: new_id,
            sender_id: data.sender_id,
            recipient_id: data.recipient_id,
            content: data.content.clone(),
            sent_at: data.sent_at,
            from_support: data.from_support,
            is_read: false,
            read_at: None,
        })
    }

    /// Get all messages involving the user, ordered by send time
    async fn find_by_participant(&self, user_id: &i32) -> Result<Vec<ChatMessage>, Error> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT
                message_id,
                sender_id,
                recipient_id,
                content,
                sent_at,
                from_support,
                is_read,
                read_at
            FROM support_messages
            WHERE sender_id = ? OR recipient_id = ?
            ORDER BY sent_at ASC
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(messages)
    }

    /// Messages of the pair view: direct messages in either direction plus
    /// pool broadcasts (recipient NULL) sent by either party
    async fn find_by_pair(&self, user_a: &i32, user_b: &i32) -> Result<Vec<ChatMessage>, Error> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT
                message_id,
                sender_id,
                recipient_id,
                content,
                sent_at,
                from_support,
                is_read,
                read_at
            FROM support_messages
            WHERE (sender_id = ? AND (recipient_id = ? OR recipient_id IS NULL))
               OR (sender_id = ? AND (recipient_id = ? OR recipient_id IS NULL))
            ORDER BY sent_at ASC
            "#,
        )
        .bind(user_a)
        .bind(user_b)
        .bind(user_b)
        .bind(user_a)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(messages)
    }

    async fn find_unread(&self, user_id: &i32) -> Result<Vec<ChatMessage>, Error> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT
                message_id,
                sender_id,
                recipient_id,
                content,
                sent_at,
                from_support,
                is_read,
                read_at
            FROM support_messages
            WHERE recipient_id = ? AND is_read = FALSE
            ORDER BY sent_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(messages)
    }

    async fn find_recent(&self, user_id: &i32, limit: i64) -> Result<Vec<ChatMessage>, Error> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT
                message_id,
                sender_id,
                recipient_id,
                content,
                sent_at,
                from_support,
                is_read,
                read_at
            FROM support_messages
            WHERE sender_id = ? OR recipient_id = ?
            ORDER BY sent_at DESC
            LIMIT ?
            "#,
        )
        .bind(user_id)
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(messages)
    }

    async fn find_by_id(&self, id: &i32) -> Result<Option<ChatMessage>, Error> {
        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT
                message_id,
                sender_id,
                recipient_id,
                content,
                sent_at,
                from_support,
                is_read,
                read_at
            FROM support_messages
            WHERE message_id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(message)
    }

    /// Monotonic read transition: the `is_read = FALSE` guard makes the
    /// update a no-op on already-read rows, so `read_at` never moves
    async fn mark_read(&self, id: &i32, read_at: &DateTime<Utc>) -> Result<(), Error> {
        sqlx::query(
            "UPDATE support_messages SET is_read = TRUE, read_at = ? WHERE message_id = ? AND is_read = FALSE",
        )
        .bind(read_at)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        Ok(())
    }
}
