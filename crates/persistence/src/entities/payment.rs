//! Payment entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{Payment, PaymentStatus, PaymentSummary};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for payment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
pub enum PaymentStatusDb {
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl From<PaymentStatusDb> for PaymentStatus {
    fn from(db_status: PaymentStatusDb) -> Self {
        match db_status {
            PaymentStatusDb::Pending => PaymentStatus::Pending,
            PaymentStatusDb::Paid => PaymentStatus::Paid,
            PaymentStatusDb::Overdue => PaymentStatus::Overdue,
            PaymentStatusDb::Cancelled => PaymentStatus::Cancelled,
        }
    }
}

impl From<PaymentStatus> for PaymentStatusDb {
    fn from(status: PaymentStatus) -> Self {
        match status {
            PaymentStatus::Pending => PaymentStatusDb::Pending,
            PaymentStatus::Paid => PaymentStatusDb::Paid,
            PaymentStatus::Overdue => PaymentStatusDb::Overdue,
            PaymentStatus::Cancelled => PaymentStatusDb::Cancelled,
        }
    }
}

/// Database row mapping for the payments table.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentEntity {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub rental_agreement_id: Option<Uuid>,
    pub date_due: NaiveDate,
    pub date_paid: Option<NaiveDate>,
    pub base_rent: f64,
    pub coop_fee: f64,
    pub electricity: f64,
    pub gas: f64,
    pub other_fees: f64,
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub status: PaymentStatusDb,
    pub invoice_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PaymentEntity> for Payment {
    fn from(entity: PaymentEntity) -> Self {
        Self {
            id: entity.id,
            landlord_id: entity.landlord_id,
            rental_agreement_id: entity.rental_agreement_id,
            date_due: entity.date_due,
            date_paid: entity.date_paid,
            base_rent: entity.base_rent,
            coop_fee: entity.coop_fee,
            electricity: entity.electricity,
            gas: entity.gas,
            other_fees: entity.other_fees,
            tax_rate: entity.tax_rate,
            tax_amount: entity.tax_amount,
            total_amount: entity.total_amount,
            status: entity.status.into(),
            invoice_url: entity.invoice_url,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Payment with its agreement's property and tenant, NULL once unlinked.
#[derive(Debug, Clone, FromRow)]
pub struct PaymentDetailEntity {
    #[sqlx(flatten)]
    pub payment: PaymentEntity,
    pub property_id: Option<Uuid>,
    pub property_address: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub tenant_name: Option<String>,
}

impl From<PaymentDetailEntity> for PaymentSummary {
    fn from(entity: PaymentDetailEntity) -> Self {
        Self {
            payment: entity.payment.into(),
            property_id: entity.property_id,
            property_address: entity.property_address,
            tenant_id: entity.tenant_id,
            tenant_name: entity.tenant_name,
        }
    }
}
