//! User repository: accounts, role profiles and sessions.

use chrono::{DateTime, Utc};
use domain::models::user::{default_profile_name, DEFAULT_CONTACT_INFO};
use domain::models::UserRole;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::entities::{
    ContactEntity, LandlordProfileEntity, TenantProfileEntity, UserEntity, UserRoleDb,
    UserSessionEntity,
};
use crate::metrics::QueryTimer;

const USER_COLUMNS: &str =
    "id, email, password_hash, role, is_active, created_at, updated_at, last_login_at";

/// Repository for user-related database operations.
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_id");
        let result = sqlx::query_as::<_, UserEntity>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find a user by email address, ignoring case.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_user_by_email");
        let result = find_by_email_on(&self.pool, email).await;
        timer.record();
        result
    }

    /// Create a user together with the profile matching its role.
    pub async fn create_with_profile(
        &self,
        email: &str,
        password_hash: &str,
        role: UserRole,
    ) -> Result<UserEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user_with_profile");

        let mut tx = self.pool.begin().await?;
        let user = insert_user(&mut tx, email, password_hash, role).await?;
        insert_default_profile(&mut tx, &user).await?;
        tx.commit().await?;

        timer.record();
        Ok(user)
    }

    /// Create an administrator unless one with this email already exists.
    ///
    /// Returns the new account, or `None` when nothing was created.
    pub async fn create_admin_if_absent(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<Option<UserEntity>, sqlx::Error> {
        let timer = QueryTimer::new("create_admin_if_absent");

        let mut tx = self.pool.begin().await?;
        if find_by_email_on(&mut *tx, email).await?.is_some() {
            tx.rollback().await?;
            timer.record();
            return Ok(None);
        }
        let user = insert_user(&mut tx, email, password_hash, UserRole::Administrator).await?;
        tx.commit().await?;

        timer.record();
        Ok(Some(user))
    }

    /// Update user's last login timestamp.
    pub async fn update_last_login(
        &self,
        user_id: Uuid,
        last_login_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_user_last_login");
        sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = $1, updated_at = NOW()
            WHERE id = $2
            "#,
        )
        .bind(last_login_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }

    /// Total number of accounts.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_users");
        let result = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await;
        timer.record();
        result
    }

    /// Return the landlord profile, creating a default one if missing.
    pub async fn ensure_landlord_profile(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<LandlordProfileEntity, sqlx::Error> {
        let timer = QueryTimer::new("ensure_landlord_profile");
        sqlx::query(
            r#"
            INSERT INTO landlord_profiles (user_id, name, contact_info)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(default_profile_name(UserRole::Landlord, email))
        .bind(DEFAULT_CONTACT_INFO)
        .execute(&self.pool)
        .await?;

        let result = sqlx::query_as::<_, LandlordProfileEntity>(
            r#"
            SELECT user_id, name, contact_info, tax_residency_country, created_at, updated_at
            FROM landlord_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update a landlord profile.
    pub async fn update_landlord_profile(
        &self,
        user_id: Uuid,
        name: &str,
        contact_info: &str,
        tax_residency_country: Option<&str>,
    ) -> Result<Option<LandlordProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_landlord_profile");
        let result = sqlx::query_as::<_, LandlordProfileEntity>(
            r#"
            UPDATE landlord_profiles
            SET name = $2,
                contact_info = $3,
                tax_residency_country = COALESCE($4, tax_residency_country),
                updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, name, contact_info, tax_residency_country, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(contact_info)
        .bind(tax_residency_country)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find the tenant profile for a user.
    pub async fn find_tenant_profile(
        &self,
        user_id: Uuid,
    ) -> Result<Option<TenantProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_tenant_profile");
        let result = sqlx::query_as::<_, TenantProfileEntity>(
            r#"
            SELECT user_id, name, contact_info, created_at, updated_at
            FROM tenant_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Update a tenant profile.
    pub async fn update_tenant_profile(
        &self,
        user_id: Uuid,
        name: &str,
        contact_info: &str,
    ) -> Result<Option<TenantProfileEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_tenant_profile");
        let result = sqlx::query_as::<_, TenantProfileEntity>(
            r#"
            UPDATE tenant_profiles
            SET name = $2, contact_info = $3, updated_at = NOW()
            WHERE user_id = $1
            RETURNING user_id, name, contact_info, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(name)
        .bind(contact_info)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Tenants whose email accepted an invitation from this landlord,
    /// ordered by name.
    pub async fn list_tenants_of_landlord(
        &self,
        landlord_id: Uuid,
    ) -> Result<Vec<ContactEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_tenants_of_landlord");
        let result = sqlx::query_as::<_, ContactEntity>(
            r#"
            SELECT DISTINCT u.id AS user_id, u.email, tp.name, tp.contact_info
            FROM invitations i
            JOIN users u ON LOWER(u.email) = LOWER(i.email)
            JOIN tenant_profiles tp ON tp.user_id = u.id
            WHERE i.landlord_id = $1 AND i.status = 'accepted'
            ORDER BY tp.name, u.email
            "#,
        )
        .bind(landlord_id)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Landlords whose invitation this tenant accepted, ordered by name.
    pub async fn list_landlords_of_tenant(
        &self,
        tenant_email: &str,
    ) -> Result<Vec<ContactEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_landlords_of_tenant");
        let result = sqlx::query_as::<_, ContactEntity>(
            r#"
            SELECT DISTINCT u.id AS user_id, u.email, lp.name, lp.contact_info
            FROM invitations i
            JOIN users u ON u.id = i.landlord_id
            JOIN landlord_profiles lp ON lp.user_id = u.id
            WHERE LOWER(i.email) = LOWER($1) AND i.status = 'accepted'
            ORDER BY lp.name, u.email
            "#,
        )
        .bind(tenant_email)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Create a new user session.
    pub async fn create_session(
        &self,
        user_id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<UserSessionEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_user_session");
        let result = sqlx::query_as::<_, UserSessionEntity>(
            r#"
            INSERT INTO user_sessions (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, token_hash, expires_at, created_at, last_used_at
            "#,
        )
        .bind(user_id)
        .bind(token_hash)
        .bind(expires_at)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Find an unexpired session by token hash.
    pub async fn find_session_by_token(
        &self,
        token_hash: &str,
    ) -> Result<Option<UserSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_session_by_token");
        let result = sqlx::query_as::<_, UserSessionEntity>(
            r#"
            SELECT id, user_id, token_hash, expires_at, created_at, last_used_at
            FROM user_sessions
            WHERE token_hash = $1 AND expires_at > NOW()
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Delete a session by token hash (logout).
    pub async fn delete_session_by_token(&self, token_hash: &str) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("delete_session_by_token");
        sqlx::query("DELETE FROM user_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        timer.record();
        Ok(())
    }

    /// Drop this user's sessions that have already expired.
    pub async fn delete_expired_sessions(&self, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_expired_sessions");
        let result = sqlx::query(
            "DELETE FROM user_sessions WHERE user_id = $1 AND expires_at <= NOW()",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Update session last_used_at timestamp.
    pub async fn update_session_last_used(
        &self,
        token_hash: &str,
        last_used_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("update_session_last_used");
        sqlx::query(
            r#"
            UPDATE user_sessions
            SET last_used_at = $1
            WHERE token_hash = $2
            "#,
        )
        .bind(last_used_at)
        .bind(token_hash)
        .execute(&self.pool)
        .await?;
        timer.record();
        Ok(())
    }
}

pub(crate) async fn find_by_email_on<'e, E>(
    executor: E,
    email: &str,
) -> Result<Option<UserEntity>, sqlx::Error>
where
    E: sqlx::Executor<'e, Database = sqlx::Postgres>,
{
    let sql = format!(
        "SELECT {} FROM users WHERE LOWER(email) = LOWER($1)",
        USER_COLUMNS
    );
    sqlx::query_as::<_, UserEntity>(&sql)
        .bind(email)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn insert_user(
    conn: &mut PgConnection,
    email: &str,
    password_hash: &str,
    role: UserRole,
) -> Result<UserEntity, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO users (email, password_hash, role)
        VALUES (LOWER($1), $2, $3)
        RETURNING {}
        "#,
        USER_COLUMNS
    );
    sqlx::query_as::<_, UserEntity>(&sql)
        .bind(email)
        .bind(password_hash)
        .bind(UserRoleDb::from(role))
        .fetch_one(conn)
        .await
}

/// Creates the default tenant profile for `user_id` if it has none.
pub(crate) async fn ensure_tenant_profile_on(
    conn: &mut PgConnection,
    user_id: Uuid,
    email: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO tenant_profiles (user_id, name, contact_info)
        VALUES ($1, $2, $3)
        ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(default_profile_name(UserRole::Tenant, email))
    .bind(DEFAULT_CONTACT_INFO)
    .execute(conn)
    .await?;
    Ok(())
}

async fn insert_default_profile(
    conn: &mut PgConnection,
    user: &UserEntity,
) -> Result<(), sqlx::Error> {
    match UserRole::from(user.role) {
        UserRole::Tenant => ensure_tenant_profile_on(conn, user.id, &user.email).await,
        UserRole::Landlord => {
            sqlx::query(
                r#"
                INSERT INTO landlord_profiles (user_id, name, contact_info)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(user.id)
            .bind(default_profile_name(UserRole::Landlord, &user.email))
            .bind(DEFAULT_CONTACT_INFO)
            .execute(conn)
            .await?;
            Ok(())
        }
        UserRole::Administrator => Ok(()),
    }
}
