//! Rental agreement entities (database row mappings).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{AgreementSummary, RentalAgreement};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the rental_agreements table.
#[derive(Debug, Clone, FromRow)]
pub struct RentalAgreementEntity {
    pub id: Uuid,
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub base_rent: f64,
    pub coop_fee: f64,
    pub electricity: f64,
    pub gas: f64,
    pub other_fees: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<RentalAgreementEntity> for RentalAgreement {
    fn from(entity: RentalAgreementEntity) -> Self {
        Self {
            id: entity.id,
            property_id: entity.property_id,
            tenant_id: entity.tenant_id,
            start_date: entity.start_date,
            end_date: entity.end_date,
            base_rent: entity.base_rent,
            coop_fee: entity.coop_fee,
            electricity: entity.electricity,
            gas: entity.gas,
            other_fees: entity.other_fees,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Agreement joined with its property's address and owner and the tenant's name.
#[derive(Debug, Clone, FromRow)]
pub struct RentalAgreementDetailEntity {
    #[sqlx(flatten)]
    pub agreement: RentalAgreementEntity,
    pub landlord_id: Uuid,
    pub property_address: String,
    pub tenant_name: String,
    pub tenant_email: String,
}

impl From<RentalAgreementDetailEntity> for AgreementSummary {
    fn from(entity: RentalAgreementDetailEntity) -> Self {
        Self {
            agreement: entity.agreement.into(),
            landlord_id: entity.landlord_id,
            property_address: entity.property_address,
            tenant_name: entity.tenant_name,
            tenant_email: entity.tenant_email,
        }
    }
}
