//! Invitation repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::UserRole;
use sqlx::PgPool;
use uuid::Uuid;

use super::user::{ensure_tenant_profile_on, find_by_email_on, insert_user};
use crate::entities::{InvitationDetailEntity, InvitationEntity, InvitationStatusDb, UserEntity};
use crate::metrics::QueryTimer;

const INVITATION_COLUMNS: &str =
    "i.id, i.email, i.property_id, i.landlord_id, i.token, i.status, i.created_at, i.expires_at";

/// Result of an acceptance attempt.
#[derive(Debug)]
pub enum AcceptOutcome {
    /// The invitation is now accepted by `user`.
    Accepted {
        user: UserEntity,
        account_created: bool,
    },
    /// Unknown token, or the invitation is no longer pending.
    NotAvailable,
    /// An account exists for the email but it is not a tenant.
    NotTenant,
    /// No account exists and no password was supplied to create one.
    PasswordRequired,
}

/// Repository for invitation-related database operations.
#[derive(Clone)]
pub struct InvitationRepository {
    pool: PgPool,
}

impl InvitationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Mark every pending invitation past its expiry date as expired.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("expire_overdue_invitations");
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET status = 'expired'
            WHERE status = 'pending' AND expires_at < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Invitations sent by a landlord, newest first.
    pub async fn list_by_landlord(
        &self,
        landlord_id: Uuid,
    ) -> Result<Vec<InvitationDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_invitations_by_landlord");
        let sql = format!(
            r#"
            SELECT {}, p.address AS property_address
            FROM invitations i
            JOIN properties p ON p.id = i.property_id
            WHERE i.landlord_id = $1
            ORDER BY i.created_at DESC, i.id
            "#,
            INVITATION_COLUMNS
        );
        let result = sqlx::query_as::<_, InvitationDetailEntity>(&sql)
            .bind(landlord_id)
            .fetch_all(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Statuses of the existing invitations for this email and property.
    pub async fn statuses_for(
        &self,
        email: &str,
        property_id: Uuid,
    ) -> Result<Vec<InvitationStatusDb>, sqlx::Error> {
        let timer = QueryTimer::new("invitation_statuses_for");
        let result = sqlx::query_scalar::<_, InvitationStatusDb>(
            r#"
            SELECT status
            FROM invitations
            WHERE LOWER(email) = LOWER($1) AND property_id = $2
            "#,
        )
        .bind(email)
        .bind(property_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Insert a new pending invitation.
    pub async fn create(
        &self,
        email: &str,
        property_id: Uuid,
        landlord_id: Uuid,
        token: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<InvitationEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(
            r#"
            INSERT INTO invitations (email, property_id, landlord_id, token, status, expires_at)
            VALUES ($1, $2, $3, $4, 'pending', $5)
            RETURNING id, email, property_id, landlord_id, token, status, created_at, expires_at
            "#,
        )
        .bind(email)
        .bind(property_id)
        .bind(landlord_id)
        .bind(token)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an invitation by ID, with its property address.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<InvitationDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation_by_id");
        let sql = format!(
            r#"
            SELECT {}, p.address AS property_address
            FROM invitations i
            JOIN properties p ON p.id = i.property_id
            WHERE i.id = $1
            "#,
            INVITATION_COLUMNS
        );
        let result = sqlx::query_as::<_, InvitationDetailEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Find an invitation by its public token, with its property address.
    pub async fn find_by_token(
        &self,
        token: Uuid,
    ) -> Result<Option<InvitationDetailEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_invitation_by_token");
        let sql = format!(
            r#"
            SELECT {}, p.address AS property_address
            FROM invitations i
            JOIN properties p ON p.id = i.property_id
            WHERE i.token = $1
            "#,
            INVITATION_COLUMNS
        );
        let result = sqlx::query_as::<_, InvitationDetailEntity>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Reissue a pending or expired invitation in place: back to pending,
    /// fresh dates and a new token. Returns `None` for any other status.
    pub async fn resend(
        &self,
        id: Uuid,
        token: Uuid,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Option<InvitationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("resend_invitation");
        let result = sqlx::query_as::<_, InvitationEntity>(
            r#"
            UPDATE invitations
            SET status = 'pending', token = $2, created_at = $3, expires_at = $4
            WHERE id = $1 AND status IN ('pending', 'expired')
            RETURNING id, email, property_id, landlord_id, token, status, created_at, expires_at
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(issued_at)
        .bind(expires_at)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete an invitation regardless of status.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_invitation");
        let result = sqlx::query("DELETE FROM invitations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Reject a pending, unexpired invitation. Returns false otherwise.
    pub async fn decline(&self, token: Uuid, now: DateTime<Utc>) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("decline_invitation");
        let result = sqlx::query(
            r#"
            UPDATE invitations
            SET status = 'rejected'
            WHERE token = $1 AND status = 'pending' AND expires_at >= $2
            "#,
        )
        .bind(token)
        .bind(now)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }

    /// Pending, unexpired invitations sent by a landlord.
    pub async fn count_pending_by_landlord(
        &self,
        landlord_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_pending_invitations");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM invitations
            WHERE landlord_id = $1 AND status = 'pending' AND expires_at >= $2
            "#,
        )
        .bind(landlord_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Accept an invitation in a single transaction.
    ///
    /// Expires the invitation first if it is overdue, then requires it to be
    /// pending. An existing account for the invited email must be a tenant;
    /// otherwise a tenant account is created from `new_password_hash`. The
    /// tenant profile is created when missing.
    pub async fn accept(
        &self,
        token: Uuid,
        new_password_hash: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<AcceptOutcome, sqlx::Error> {
        let timer = QueryTimer::new("accept_invitation");
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE invitations
            SET status = 'expired'
            WHERE token = $1 AND status = 'pending' AND expires_at < $2
            "#,
        )
        .bind(token)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let invitation = sqlx::query_as::<_, InvitationEntity>(
            r#"
            SELECT id, email, property_id, landlord_id, token, status, created_at, expires_at
            FROM invitations
            WHERE token = $1
            FOR UPDATE
            "#,
        )
        .bind(token)
        .fetch_optional(&mut *tx)
        .await?;

        let invitation = match invitation {
            Some(inv) if inv.status == InvitationStatusDb::Pending => inv,
            _ => {
                tx.commit().await?;
                timer.record();
                return Ok(AcceptOutcome::NotAvailable);
            }
        };

        let (user, account_created) = match find_by_email_on(&mut *tx, &invitation.email).await? {
            Some(user) if UserRole::from(user.role) != UserRole::Tenant => {
                tx.commit().await?;
                timer.record();
                return Ok(AcceptOutcome::NotTenant);
            }
            Some(user) => (user, false),
            None => match new_password_hash {
                Some(hash) => (
                    insert_user(&mut tx, &invitation.email, hash, UserRole::Tenant).await?,
                    true,
                ),
                None => {
                    tx.commit().await?;
                    timer.record();
                    return Ok(AcceptOutcome::PasswordRequired);
                }
            },
        };

        ensure_tenant_profile_on(&mut tx, user.id, &user.email).await?;

        sqlx::query("UPDATE invitations SET status = 'accepted' WHERE id = $1")
            .bind(invitation.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        timer.record();
        Ok(AcceptOutcome::Accepted {
            user,
            account_created,
        })
    }
}
