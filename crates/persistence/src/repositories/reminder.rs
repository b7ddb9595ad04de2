//! Reminder repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::reminder::ReminderInput;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{ReminderDetailEntity, ReminderEntity};
use crate::metrics::QueryTimer;

const DETAIL_SELECT: &str = r#"
    SELECT r.id, r.property_id, r.title, r.description, r.due_date, r.is_completed,
           r.created_at, r.updated_at,
           p.address AS property_address, p.landlord_id
    FROM reminders r
    JOIN properties p ON p.id = r.property_id
"#;

/// Repository for reminder-related database operations.
#[derive(Clone)]
pub struct ReminderRepository {
    pool: PgPool,
}

impl ReminderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, input: &ReminderInput) -> Result<ReminderEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_reminder");
        let result = sqlx::query_as::<_, ReminderEntity>(
            r#"
            INSERT INTO reminders (property_id, title, description, due_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, property_id, title, description, due_date, is_completed,
                      created_at, updated_at
            "#,
        )
        .bind(input.property_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.due_date)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a reminder together with its property's address and owner.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ReminderDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_reminder_by_id");
        let sql = format!("{} WHERE r.id = $1", DETAIL_SELECT);
        let result = sqlx::query_as::<_, ReminderDetailEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Reminders on a landlord's properties, earliest due first.
    pub async fn list_by_landlord(
        &self,
        landlord_id: Uuid,
    ) -> Result<Vec<ReminderDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_reminders_by_landlord");
        let sql = format!(
            "{} WHERE p.landlord_id = $1 ORDER BY r.due_date, r.created_at",
            DETAIL_SELECT
        );
        let result = sqlx::query_as::<_, ReminderDetailEntity>(&sql)
            .bind(landlord_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Open reminders on a landlord's properties that were due before `now`.
    pub async fn list_overdue_by_landlord(
        &self,
        landlord_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<ReminderDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_overdue_reminders");
        let sql = format!(
            "{} WHERE p.landlord_id = $1 AND r.is_completed = false AND r.due_date < $2 \
             ORDER BY r.due_date",
            DETAIL_SELECT
        );
        let result = sqlx::query_as::<_, ReminderDetailEntity>(&sql)
            .bind(landlord_id)
            .bind(now)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &ReminderInput,
    ) -> Result<Option<ReminderEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_reminder");
        let result = sqlx::query_as::<_, ReminderEntity>(
            r#"
            UPDATE reminders
            SET property_id = $2, title = $3, description = $4, due_date = $5, updated_at = NOW()
            WHERE id = $1
            RETURNING id, property_id, title, description, due_date, is_completed,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(input.property_id)
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.due_date)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Flip `is_completed`.
    pub async fn toggle_completed(&self, id: Uuid) -> Result<Option<ReminderEntity>, sqlx::Error> {
        let timer = QueryTimer::new("toggle_reminder");
        let result = sqlx::query_as::<_, ReminderEntity>(
            r#"
            UPDATE reminders
            SET is_completed = NOT is_completed, updated_at = NOW()
            WHERE id = $1
            RETURNING id, property_id, title, description, due_date, is_completed,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_reminder");
        let result = sqlx::query("DELETE FROM reminders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
