//! Session-cookie authentication extractors.
//!
//! The `sessionid` cookie carries a random token; its SHA-256 hash is looked
//! up in `user_sessions`. The lookup result is cached in request extensions
//! so a handler that takes both [`CurrentUser`] and [`Page`](super::Page)
//! only hits the database once.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, Method},
};
use chrono::Utc;
use domain::models::{LandlordProfile, User, UserRole};
use domain::services::Actor;
use persistence::repositories::{MessageRepository, UserRepository};
use shared::crypto::sha256_hex;

use crate::app::AppState;
use crate::error::AppError;
use crate::services::cookies::{CookieHelper, SESSION_COOKIE};

/// An authenticated, active user.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    /// Unread messages addressed to the user, for the navigation badge.
    pub unread_messages: i64,
}

impl CurrentUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user.id, self.user.role)
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }
}

#[derive(Debug, Clone)]
struct SessionLookup(Option<CurrentUser>);

async fn lookup(parts: &Parts, state: &AppState) -> Result<Option<CurrentUser>, AppError> {
    let Some(token) = CookieHelper::extract_cookie(&parts.headers, SESSION_COOKIE) else {
        return Ok(None);
    };
    let token_hash = sha256_hex(token);

    let users = UserRepository::new(state.pool.clone());
    let Some(session) = users.find_session_by_token(&token_hash).await? else {
        return Ok(None);
    };
    let user: User = match users.find_by_id(session.user_id).await? {
        Some(user) if user.is_active => user.into(),
        _ => return Ok(None),
    };

    users
        .update_session_last_used(&token_hash, Utc::now())
        .await?;
    let unread_messages = MessageRepository::new(state.pool.clone())
        .count_unread(user.id)
        .await?;

    Ok(Some(CurrentUser {
        user,
        unread_messages,
    }))
}

/// Resolves the session once per request.
pub(crate) async fn load(
    parts: &mut Parts,
    state: &AppState,
) -> Result<Option<CurrentUser>, AppError> {
    if let Some(SessionLookup(cached)) = parts.extensions.get::<SessionLookup>() {
        return Ok(cached.clone());
    }
    let current = lookup(parts, state).await?;
    parts.extensions.insert(SessionLookup(current.clone()));
    Ok(current)
}

fn login_required(parts: &Parts) -> AppError {
    // Only GETs can be replayed after login.
    let next = (parts.method == Method::GET)
        .then(|| parts.uri.path_and_query().map(|pq| pq.as_str().to_string()))
        .flatten();
    AppError::LoginRequired { next }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        load(parts, state)
            .await?
            .ok_or_else(|| login_required(parts))
    }
}

/// Authentication that does not reject anonymous requests.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<CurrentUser>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(load(parts, state).await?))
    }
}

/// A landlord, together with their profile. The profile is created with
/// default values when missing.
#[derive(Debug, Clone)]
pub struct LandlordUser {
    pub current: CurrentUser,
    pub profile: LandlordProfile,
}

impl LandlordUser {
    pub fn user(&self) -> &User {
        &self.current.user
    }

    pub fn id(&self) -> uuid::Uuid {
        self.current.user.id
    }
}

#[async_trait]
impl FromRequestParts<AppState> for LandlordUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = CurrentUser::from_request_parts(parts, state).await?;
        if current.role() != UserRole::Landlord {
            return Err(AppError::Forbidden(
                "Only landlords can access this page.".to_string(),
            ));
        }
        let profile = UserRepository::new(state.pool.clone())
            .ensure_landlord_profile(current.user.id, &current.user.email)
            .await?
            .into();
        Ok(LandlordUser { current, profile })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(method: Method, uri: &str) -> Parts {
        let (parts, _) = Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_login_required_keeps_get_target() {
        let error = login_required(&parts(Method::GET, "/reminders?x=1"));
        assert!(matches!(
            error,
            AppError::LoginRequired { next: Some(ref n) } if n == "/reminders?x=1"
        ));
    }

    #[test]
    fn test_login_required_drops_post_target() {
        let error = login_required(&parts(Method::POST, "/properties/1/delete"));
        assert!(matches!(error, AppError::LoginRequired { next: None }));
    }
}
