//! User, profile and session entities (database row mappings).

use chrono::{DateTime, Utc};
use domain::models::{Contact, LandlordProfile, TenantProfile, User, UserRole, UserSession};
use sqlx::FromRow;
use uuid::Uuid;

/// Database enum for user roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
pub enum UserRoleDb {
    Tenant,
    Landlord,
    Administrator,
}

impl From<UserRoleDb> for UserRole {
    fn from(db_role: UserRoleDb) -> Self {
        match db_role {
            UserRoleDb::Tenant => UserRole::Tenant,
            UserRoleDb::Landlord => UserRole::Landlord,
            UserRoleDb::Administrator => UserRole::Administrator,
        }
    }
}

impl From<UserRole> for UserRoleDb {
    fn from(role: UserRole) -> Self {
        match role {
            UserRole::Tenant => UserRoleDb::Tenant,
            UserRole::Landlord => UserRoleDb::Landlord,
            UserRole::Administrator => UserRoleDb::Administrator,
        }
    }
}

/// Database row mapping for the users table.
#[derive(Debug, Clone, FromRow)]
pub struct UserEntity {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub role: UserRoleDb,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl From<UserEntity> for User {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            email: entity.email,
            password_hash: entity.password_hash,
            role: entity.role.into(),
            is_active: entity.is_active,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
            last_login_at: entity.last_login_at,
        }
    }
}

/// Database row mapping for the landlord_profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct LandlordProfileEntity {
    pub user_id: Uuid,
    pub name: String,
    pub contact_info: String,
    pub tax_residency_country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<LandlordProfileEntity> for LandlordProfile {
    fn from(entity: LandlordProfileEntity) -> Self {
        Self {
            user_id: entity.user_id,
            name: entity.name,
            contact_info: entity.contact_info,
            tax_residency_country: entity.tax_residency_country,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Database row mapping for the tenant_profiles table.
#[derive(Debug, Clone, FromRow)]
pub struct TenantProfileEntity {
    pub user_id: Uuid,
    pub name: String,
    pub contact_info: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<TenantProfileEntity> for TenantProfile {
    fn from(entity: TenantProfileEntity) -> Self {
        Self {
            user_id: entity.user_id,
            name: entity.name,
            contact_info: entity.contact_info,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// A profile joined with its account email.
#[derive(Debug, Clone, FromRow)]
pub struct ContactEntity {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub contact_info: String,
}

impl From<ContactEntity> for Contact {
    fn from(entity: ContactEntity) -> Self {
        Self {
            user_id: entity.user_id,
            email: entity.email,
            name: entity.name,
            contact_info: entity.contact_info,
        }
    }
}

/// Database row mapping for the user_sessions table.
#[derive(Debug, Clone, FromRow)]
pub struct UserSessionEntity {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

impl From<UserSessionEntity> for UserSession {
    fn from(entity: UserSessionEntity) -> Self {
        Self {
            id: entity.id,
            user_id: entity.user_id,
            token_hash: entity.token_hash,
            expires_at: entity.expires_at,
            created_at: entity.created_at,
            last_used_at: entity.last_used_at,
        }
    }
}
