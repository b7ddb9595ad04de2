//! Property repository for database operations.

use domain::models::property::PropertyInput;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PropertyEntity, PropertyStatusDb};
use crate::metrics::QueryTimer;

/// Repository for property-related database operations.
#[derive(Clone)]
pub struct PropertyRepository {
    pool: PgPool,
}

impl PropertyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a property owned by `landlord_id`.
    pub async fn create(
        &self,
        landlord_id: Uuid,
        input: &PropertyInput,
    ) -> Result<PropertyEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_property");
        let result = sqlx::query_as::<_, PropertyEntity>(
            r#"
            INSERT INTO properties
                (landlord_id, address, city, postal_code, area_m2, current_rent, additional_costs, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, landlord_id, address, city, postal_code, area_m2, current_rent,
                      additional_costs, status, created_at, updated_at
            "#,
        )
        .bind(landlord_id)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.postal_code)
        .bind(input.area_m2)
        .bind(input.current_rent)
        .bind(input.additional_costs)
        .bind(PropertyStatusDb::from(input.status))
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a property by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PropertyEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_property_by_id");
        let result = sqlx::query_as::<_, PropertyEntity>(
            r#"
            SELECT id, landlord_id, address, city, postal_code, area_m2, current_rent,
                   additional_costs, status, created_at, updated_at
            FROM properties
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Properties owned by a landlord, newest first.
    pub async fn list_by_landlord(
        &self,
        landlord_id: Uuid,
    ) -> Result<Vec<PropertyEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_properties_by_landlord");
        let result = sqlx::query_as::<_, PropertyEntity>(
            r#"
            SELECT id, landlord_id, address, city, postal_code, area_m2, current_rent,
                   additional_costs, status, created_at, updated_at
            FROM properties
            WHERE landlord_id = $1
            ORDER BY created_at DESC, id
            "#,
        )
        .bind(landlord_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Every property, newest first.
    pub async fn list_all(&self) -> Result<Vec<PropertyEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_all_properties");
        let result = sqlx::query_as::<_, PropertyEntity>(
            r#"
            SELECT id, landlord_id, address, city, postal_code, area_m2, current_rent,
                   additional_costs, status, created_at, updated_at
            FROM properties
            ORDER BY created_at DESC, id
            "#,
        )
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Overwrite the editable fields of a property.
    pub async fn update(
        &self,
        id: Uuid,
        input: &PropertyInput,
    ) -> Result<Option<PropertyEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_property");
        let result = sqlx::query_as::<_, PropertyEntity>(
            r#"
            UPDATE properties
            SET address = $2,
                city = $3,
                postal_code = $4,
                area_m2 = $5,
                current_rent = $6,
                additional_costs = $7,
                status = $8,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, landlord_id, address, city, postal_code, area_m2, current_rent,
                      additional_costs, status, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&input.address)
        .bind(&input.city)
        .bind(&input.postal_code)
        .bind(input.area_m2)
        .bind(input.current_rent)
        .bind(input.additional_costs)
        .bind(PropertyStatusDb::from(input.status))
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a property; reminders and invitations go with it.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_property");
        let result = sqlx::query("DELETE FROM properties WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    pub async fn count_by_landlord(&self, landlord_id: Uuid) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_properties_by_landlord");
        let result =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM properties WHERE landlord_id = $1")
                .bind(landlord_id)
                .fetch_one(&self.pool)
                .await;
        timer.record();
        result
    }

    pub async fn count_all(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_all_properties");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM properties")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }
}
