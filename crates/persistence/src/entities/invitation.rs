//! Invitation entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Invitation, InvitationStatus, InvitationSummary};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for invitation status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "invitation_status", rename_all = "lowercase")]
pub enum InvitationStatusDb {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl From<InvitationStatusDb> for InvitationStatus {
    fn from(db_status: InvitationStatusDb) -> Self {
        match db_status {
            InvitationStatusDb::Pending => InvitationStatus::Pending,
            InvitationStatusDb::Accepted => InvitationStatus::Accepted,
            InvitationStatusDb::Rejected => InvitationStatus::Rejected,
            InvitationStatusDb::Expired => InvitationStatus::Expired,
        }
    }
}

impl From<InvitationStatus> for InvitationStatusDb {
    fn from(status: InvitationStatus) -> Self {
        match status {
            InvitationStatus::Pending => InvitationStatusDb::Pending,
            InvitationStatus::Accepted => InvitationStatusDb::Accepted,
            InvitationStatus::Rejected => InvitationStatusDb::Rejected,
            InvitationStatus::Expired => InvitationStatusDb::Expired,
        }
    }
}

/// Database row mapping for the invitations table.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationEntity {
    pub id: Uuid,
    pub email: String,
    pub property_id: Uuid,
    pub landlord_id: Uuid,
    pub token: Uuid,
    pub status: InvitationStatusDb,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl From<InvitationEntity> for Invitation {
    fn from(entity: InvitationEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            property_id: entity.property_id,
            landlord_id: entity.landlord_id,
            token: entity.token,
            status: entity.status.into(),
            created_at: entity.created_at,
            expires_at: entity.expires_at,
        }
    }
}

/// Invitation row joined with its property address.
#[derive(Debug, Clone, FromRow)]
pub struct InvitationDetailEntity {
    #[sqlx(flatten)]
    pub invitation: InvitationEntity,
    pub property_address: String,
}

impl From<InvitationDetailEntity> for InvitationSummary {
    fn from(entity: InvitationDetailEntity) -> Self {
        Self {
            invitation: entity.invitation.into(),
            property_address: entity.property_address,
        }
    }
}
