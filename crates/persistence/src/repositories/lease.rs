//! Rental agreement repository for database operations.

use domain::models::lease::RentalAgreementInput;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{RentalAgreementDetailEntity, RentalAgreementEntity};
use crate::metrics::QueryTimer;

const RETURNING: &str = r#"
    RETURNING id, property_id, tenant_id, start_date, end_date, base_rent, coop_fee,
              electricity, gas, other_fees, created_at, updated_at
"#;

const DETAIL_SELECT: &str = r#"
    SELECT ra.id, ra.property_id, ra.tenant_id, ra.start_date, ra.end_date, ra.base_rent,
           ra.coop_fee, ra.electricity, ra.gas, ra.other_fees, ra.created_at, ra.updated_at,
           p.landlord_id, p.address AS property_address,
           COALESCE(tp.name, '') AS tenant_name, u.email AS tenant_email
    FROM rental_agreements ra
    JOIN properties p ON p.id = ra.property_id
    JOIN users u ON u.id = ra.tenant_id
    LEFT JOIN tenant_profiles tp ON tp.user_id = ra.tenant_id
"#;

/// Repository for rental agreement database operations.
#[derive(Clone)]
pub struct RentalAgreementRepository {
    pool: PgPool,
}

impl RentalAgreementRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        input: &RentalAgreementInput,
    ) -> Result<RentalAgreementEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_rental_agreement");
        let sql = format!(
            r#"
            INSERT INTO rental_agreements
                (property_id, tenant_id, start_date, end_date, base_rent, coop_fee,
                 electricity, gas, other_fees)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            {}
            "#,
            RETURNING
        );
        let result = sqlx::query_as::<_, RentalAgreementEntity>(&sql)
            .bind(input.property_id)
            .bind(input.tenant_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.base_rent)
            .bind(input.coop_fee)
            .bind(input.electricity)
            .bind(input.gas)
            .bind(input.other_fees)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Find an agreement together with its property's owner.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<RentalAgreementDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_rental_agreement_by_id");
        let sql = format!("{} WHERE ra.id = $1", DETAIL_SELECT);
        let result = sqlx::query_as::<_, RentalAgreementDetailEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Agreements on a landlord's properties, grouped by property.
    pub async fn list_by_landlord(
        &self,
        landlord_id: Uuid,
    ) -> Result<Vec<RentalAgreementDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_rental_agreements_by_landlord");
        let sql = format!(
            "{} WHERE p.landlord_id = $1 \
             ORDER BY p.address, tenant_name, u.email, ra.start_date NULLS FIRST, ra.created_at",
            DETAIL_SELECT
        );
        let result = sqlx::query_as::<_, RentalAgreementDetailEntity>(&sql)
            .bind(landlord_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &RentalAgreementInput,
    ) -> Result<Option<RentalAgreementEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_rental_agreement");
        let sql = format!(
            r#"
            UPDATE rental_agreements
            SET property_id = $2, tenant_id = $3, start_date = $4, end_date = $5,
                base_rent = $6, coop_fee = $7, electricity = $8, gas = $9, other_fees = $10,
                updated_at = NOW()
            WHERE id = $1
            {}
            "#,
            RETURNING
        );
        let result = sqlx::query_as::<_, RentalAgreementEntity>(&sql)
            .bind(id)
            .bind(input.property_id)
            .bind(input.tenant_id)
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(input.base_rent)
            .bind(input.coop_fee)
            .bind(input.electricity)
            .bind(input.gas)
            .bind(input.other_fees)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Payments keep their landlord and lose the link.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_rental_agreement");
        let result = sqlx::query("DELETE FROM rental_agreements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
