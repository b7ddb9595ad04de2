//! Payment repository for database operations.

use chrono::NaiveDate;
use domain::models::payment::{PaymentCharges, PaymentInput};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{PaymentDetailEntity, PaymentEntity, PaymentStatusDb};
use crate::metrics::QueryTimer;

const COLUMNS: &str = r#"
    id, landlord_id, rental_agreement_id, date_due, date_paid, base_rent, coop_fee,
    electricity, gas, other_fees, tax_rate, tax_amount, total_amount, status, invoice_url,
    created_at, updated_at
"#;

const DETAIL_SELECT: &str = r#"
    SELECT pay.id, pay.landlord_id, pay.rental_agreement_id, pay.date_due, pay.date_paid,
           pay.base_rent, pay.coop_fee, pay.electricity, pay.gas, pay.other_fees,
           pay.tax_rate, pay.tax_amount, pay.total_amount, pay.status, pay.invoice_url,
           pay.created_at, pay.updated_at,
           p.id AS property_id, p.address AS property_address,
           ra.tenant_id, COALESCE(NULLIF(tp.name, ''), u.email) AS tenant_name
    FROM payments pay
    LEFT JOIN rental_agreements ra ON ra.id = pay.rental_agreement_id
    LEFT JOIN properties p ON p.id = ra.property_id
    LEFT JOIN users u ON u.id = ra.tenant_id
    LEFT JOIN tenant_profiles tp ON tp.user_id = ra.tenant_id
"#;

/// Repository for payment database operations.
#[derive(Clone)]
pub struct PaymentRepository {
    pool: PgPool,
}

impl PaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        landlord_id: Uuid,
        input: &PaymentInput,
        charges: &PaymentCharges,
    ) -> Result<PaymentEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_payment");
        let sql = format!(
            r#"
            INSERT INTO payments
                (landlord_id, rental_agreement_id, date_due, date_paid, base_rent, coop_fee,
                 electricity, gas, other_fees, tax_rate, tax_amount, total_amount, status,
                 invoice_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            RETURNING {}
            "#,
            COLUMNS
        );
        let result = sqlx::query_as::<_, PaymentEntity>(&sql)
            .bind(landlord_id)
            .bind(input.rental_agreement_id)
            .bind(input.date_due)
            .bind(input.date_paid)
            .bind(input.base_rent)
            .bind(input.coop_fee)
            .bind(input.electricity)
            .bind(input.gas)
            .bind(input.other_fees)
            .bind(charges.tax_rate)
            .bind(charges.tax_amount)
            .bind(charges.total_amount)
            .bind(PaymentStatusDb::from(input.status))
            .bind(&input.invoice_url)
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<PaymentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_payment_by_id");
        let sql = format!("SELECT {} FROM payments WHERE id = $1", COLUMNS);
        let result = sqlx::query_as::<_, PaymentEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// A landlord's payments due within `[from, to]`, ordered for grouping
    /// by property then tenant. Unlinked payments come last.
    pub async fn list_by_landlord_between(
        &self,
        landlord_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<PaymentDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_payments_by_landlord");
        let sql = format!(
            "{} WHERE pay.landlord_id = $1 AND pay.date_due >= $2 AND pay.date_due <= $3 \
             ORDER BY p.address NULLS LAST, p.id, tenant_name, ra.tenant_id, pay.date_due, \
             pay.created_at",
            DETAIL_SELECT
        );
        let result = sqlx::query_as::<_, PaymentDetailEntity>(&sql)
            .bind(landlord_id)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Payments on the tenant's agreements, latest due first.
    pub async fn list_for_tenant(
        &self,
        tenant_id: Uuid,
    ) -> Result<Vec<PaymentDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_payments_for_tenant");
        let sql = format!(
            "{} WHERE ra.tenant_id = $1 ORDER BY pay.date_due DESC, pay.created_at DESC",
            DETAIL_SELECT
        );
        let result = sqlx::query_as::<_, PaymentDetailEntity>(&sql)
            .bind(tenant_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Base rent due to the landlord from `year_start` up to, not including,
    /// `due`. `exclude` leaves out the payment being edited.
    pub async fn ytd_base_rent_before(
        &self,
        landlord_id: Uuid,
        year_start: NaiveDate,
        due: NaiveDate,
        exclude: Option<Uuid>,
    ) -> Result<f64, sqlx::Error> {
        let timer = QueryTimer::new("ytd_base_rent_before");
        let result = sqlx::query_scalar::<_, f64>(
            r#"
            SELECT COALESCE(SUM(base_rent), 0)::DOUBLE PRECISION
            FROM payments
            WHERE landlord_id = $1 AND date_due >= $2 AND date_due < $3
              AND ($4::UUID IS NULL OR id <> $4)
            "#,
        )
        .bind(landlord_id)
        .bind(year_start)
        .bind(due)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn update(
        &self,
        id: Uuid,
        input: &PaymentInput,
        charges: &PaymentCharges,
    ) -> Result<Option<PaymentEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_payment");
        let sql = format!(
            r#"
            UPDATE payments
            SET rental_agreement_id = $2, date_due = $3, date_paid = $4, base_rent = $5,
                coop_fee = $6, electricity = $7, gas = $8, other_fees = $9, tax_rate = $10,
                tax_amount = $11, total_amount = $12, status = $13, invoice_url = $14,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            COLUMNS
        );
        let result = sqlx::query_as::<_, PaymentEntity>(&sql)
            .bind(id)
            .bind(input.rental_agreement_id)
            .bind(input.date_due)
            .bind(input.date_paid)
            .bind(input.base_rent)
            .bind(input.coop_fee)
            .bind(input.electricity)
            .bind(input.gas)
            .bind(input.other_fees)
            .bind(charges.tax_rate)
            .bind(charges.tax_amount)
            .bind(charges.total_amount)
            .bind(PaymentStatusDb::from(input.status))
            .bind(&input.invoice_url)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_payment");
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
