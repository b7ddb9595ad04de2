//! Message entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{ConversationSummary, Message, Recipient};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the messages table.
#[derive(Debug, Clone, FromRow)]
pub struct MessageEntity {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub subject: Option<String>,
    pub content: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

impl From<MessageEntity> for Message {
    fn from(entity: MessageEntity) -> Self {
        Self {
            id: entity.id,
            sender_id: entity.sender_id,
            recipient_id: entity.recipient_id,
            subject: entity.subject,
            content: entity.content,
            sent_at: entity.sent_at,
            is_read: entity.is_read,
        }
    }
}

/// One row of the grouped conversation query.
#[derive(Debug, Clone, FromRow)]
pub struct ConversationEntity {
    pub counterpart_id: Uuid,
    pub counterpart_email: String,
    pub last_message: String,
    pub last_sent_at: DateTime<Utc>,
    pub last_sender_id: Uuid,
    pub unread_count: i64,
}

impl From<ConversationEntity> for ConversationSummary {
    fn from(entity: ConversationEntity) -> Self {
        Self {
            counterpart_id: entity.counterpart_id,
            counterpart_email: entity.counterpart_email,
            last_message: entity.last_message,
            last_sent_at: entity.last_sent_at,
            last_sender_id: entity.last_sender_id,
            unread_count: entity.unread_count,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct RecipientEntity {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
}

impl From<RecipientEntity> for Recipient {
    fn from(entity: RecipientEntity) -> Self {
        Self {
            user_id: entity.user_id,
            email: entity.email,
            name: entity.name,
        }
    }
}
