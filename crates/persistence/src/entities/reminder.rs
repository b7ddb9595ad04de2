//! Reminder entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Reminder, ReminderSummary};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the reminders table.
#[derive(Debug, Clone, FromRow)]
pub struct ReminderEntity {
    pub id: Uuid,
    pub property_id: Uuid,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ReminderEntity> for Reminder {
    fn from(entity: ReminderEntity) -> Self {
        Self {
            id: entity.id,
            property_id: entity.property_id,
            title: entity.title,
            description: entity.description,
            due_date: entity.due_date,
            is_completed: entity.is_completed,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Reminder joined with its property's address and owner.
#[derive(Debug, Clone, FromRow)]
pub struct ReminderDetailEntity {
    #[sqlx(flatten)]
    pub reminder: ReminderEntity,
    pub property_address: String,
    pub landlord_id: Uuid,
}

impl From<ReminderDetailEntity> for ReminderSummary {
    fn from(entity: ReminderDetailEntity) -> Self {
        Self {
            reminder: entity.reminder.into(),
            property_address: entity.property_address,
        }
    }
}
