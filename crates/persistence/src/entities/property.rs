//! Property entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Property, PropertyStatus};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for property status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "property_status", rename_all = "snake_case")]
pub enum PropertyStatusDb {
    Available,
    Rented,
    UnderMaintenance,
    Unavailable,
}

impl From<PropertyStatusDb> for PropertyStatus {
    fn from(db_status: PropertyStatusDb) -> Self {
        match db_status {
            PropertyStatusDb::Available => PropertyStatus::Available,
            PropertyStatusDb::Rented => PropertyStatus::Rented,
            PropertyStatusDb::UnderMaintenance => PropertyStatus::UnderMaintenance,
            PropertyStatusDb::Unavailable => PropertyStatus::Unavailable,
        }
    }
}

impl From<PropertyStatus> for PropertyStatusDb {
    fn from(status: PropertyStatus) -> Self {
        match status {
            PropertyStatus::Available => PropertyStatusDb::Available,
            PropertyStatus::Rented => PropertyStatusDb::Rented,
            PropertyStatus::UnderMaintenance => PropertyStatusDb::UnderMaintenance,
            PropertyStatus::Unavailable => PropertyStatusDb::Unavailable,
        }
    }
}

/// Database row mapping for the properties table.
#[derive(Debug, Clone, FromRow)]
pub struct PropertyEntity {
    pub id: Uuid,
    pub landlord_id: Uuid,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub area_m2: f64,
    pub current_rent: f64,
    pub additional_costs: f64,
    pub status: PropertyStatusDb,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PropertyEntity> for Property {
    fn from(entity: PropertyEntity) -> Self {
        Self {
            id: entity.id,
            landlord_id: entity.landlord_id,
            address: entity.address,
            city: entity.city,
            postal_code: entity.postal_code,
            area_m2: entity.area_m2,
            current_rent: entity.current_rent,
            additional_costs: entity.additional_costs,
            status: entity.status.into(),
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
