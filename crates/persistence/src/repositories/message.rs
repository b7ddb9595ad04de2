//! Message repository for database operations.

use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ConversationEntity, MessageEntity, RecipientEntity};
use crate::metrics::QueryTimer;

/// Repository for message-related database operations.
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        subject: Option<&str>,
        content: &str,
    ) -> Result<MessageEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_message");
        let result = sqlx::query_as::<_, MessageEntity>(
            r#"
            INSERT INTO messages (sender_id, recipient_id, subject, content)
            VALUES ($1, $2, $3, $4)
            RETURNING id, sender_id, recipient_id, subject, content, sent_at, is_read
            "#,
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(subject)
        .bind(content)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// All messages exchanged between two users, oldest first.
    pub async fn list_conversation(
        &self,
        user_id: Uuid,
        counterpart_id: Uuid,
    ) -> Result<Vec<MessageEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_conversation");
        let result = sqlx::query_as::<_, MessageEntity>(
            r#"
            SELECT id, sender_id, recipient_id, subject, content, sent_at, is_read
            FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY sent_at, id
            "#,
        )
        .bind(user_id)
        .bind(counterpart_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Mark everything `counterpart_id` sent to `reader_id` as read.
    pub async fn mark_conversation_read(
        &self,
        reader_id: Uuid,
        counterpart_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("mark_conversation_read");
        let result = sqlx::query(
            r#"
            UPDATE messages
            SET is_read = true
            WHERE recipient_id = $1 AND sender_id = $2 AND is_read = false
            "#,
        )
        .bind(reader_id)
        .bind(counterpart_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// One row per counterpart with the latest message and the number of
    /// their messages still unread, most recent conversation first.
    pub async fn list_conversations(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ConversationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_conversations");
        let result = sqlx::query_as::<_, ConversationEntity>(
            r#"
            WITH latest AS (
                SELECT DISTINCT ON (counterpart_id)
                       counterpart_id, content, sent_at, sender_id
                FROM (
                    SELECT CASE WHEN sender_id = $1 THEN recipient_id ELSE sender_id END
                               AS counterpart_id,
                           id, content, sent_at, sender_id
                    FROM messages
                    WHERE sender_id = $1 OR recipient_id = $1
                ) thread
                ORDER BY counterpart_id, sent_at DESC, id DESC
            )
            SELECT l.counterpart_id,
                   u.email AS counterpart_email,
                   l.content AS last_message,
                   l.sent_at AS last_sent_at,
                   l.sender_id AS last_sender_id,
                   (
                       SELECT COUNT(*)
                       FROM messages m
                       WHERE m.sender_id = l.counterpart_id
                         AND m.recipient_id = $1
                         AND m.is_read = false
                   ) AS unread_count
            FROM latest l
            JOIN users u ON u.id = l.counterpart_id
            ORDER BY l.sent_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Whether two users have exchanged at least one message.
    pub async fn has_conversation(
        &self,
        user_id: Uuid,
        counterpart_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("has_conversation");
        let result = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM messages
                WHERE (sender_id = $1 AND recipient_id = $2)
                   OR (sender_id = $2 AND recipient_id = $1)
            )
            "#,
        )
        .bind(user_id)
        .bind(counterpart_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Unread messages addressed to a user.
    pub async fn count_unread(&self, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_unread_messages");
        let result = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = $1 AND is_read = false",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Tenants that accepted one of this landlord's invitations.
    pub async fn recipients_for_landlord(
        &self,
        landlord_id: Uuid,
    ) -> Result<Vec<RecipientEntity>, sqlx::Error> {
        let timer = QueryTimer::new("recipients_for_landlord");
        let result = sqlx::query_as::<_, RecipientEntity>(
            r#"
            SELECT DISTINCT u.id AS user_id, u.email, tp.name
            FROM invitations i
            JOIN users u ON LOWER(u.email) = LOWER(i.email)
            LEFT JOIN tenant_profiles tp ON tp.user_id = u.id
            WHERE i.landlord_id = $1 AND i.status = 'accepted'
              AND u.role = 'tenant' AND u.is_active = true
            ORDER BY u.email
            "#,
        )
        .bind(landlord_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Landlords whose invitation this tenant accepted.
    pub async fn recipients_for_tenant(
        &self,
        tenant_email: &str,
    ) -> Result<Vec<RecipientEntity>, sqlx::Error> {
        let timer = QueryTimer::new("recipients_for_tenant");
        let result = sqlx::query_as::<_, RecipientEntity>(
            r#"
            SELECT DISTINCT u.id AS user_id, u.email, lp.name
            FROM invitations i
            JOIN users u ON u.id = i.landlord_id
            LEFT JOIN landlord_profiles lp ON lp.user_id = u.id
            WHERE LOWER(i.email) = LOWER($1) AND i.status = 'accepted' AND u.is_active = true
            ORDER BY u.email
            "#,
        )
        .bind(tenant_email)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Every other active user.
    pub async fn recipients_for_admin(
        &self,
        admin_id: Uuid,
    ) -> Result<Vec<RecipientEntity>, sqlx::Error> {
        let timer = QueryTimer::new("recipients_for_admin");
        let result = sqlx::query_as::<_, RecipientEntity>(
            r#"
            SELECT u.id AS user_id, u.email, COALESCE(lp.name, tp.name) AS name
            FROM users u
            LEFT JOIN landlord_profiles lp ON lp.user_id = u.id
            LEFT JOIN tenant_profiles tp ON tp.user_id = u.id
            WHERE u.id <> $1 AND u.is_active = true
            ORDER BY u.email
            "#,
        )
        .bind(admin_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }
}
