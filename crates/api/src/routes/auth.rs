//! Login, logout and registration handlers.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{Duration, Utc};
use domain::models::form::NON_FIELD_ERRORS;
use domain::models::user::{LoginForm, RegisterForm};
use domain::models::{FormErrors, User};
use persistence::repositories::UserRepository;
use serde::Deserialize;
use shared::crypto::{generate_session_token, sha256_hex};
use shared::password::{hash_password, verify_password};
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::{is_unique_violation, AppError};
use crate::extractors::{CsrfForm, MaybeUser, NoFields};
use crate::middleware::metrics::record_login;
use crate::services::cookies::{CookieHelper, SESSION_COOKIE};
use crate::services::flash::{redirect, see_other, FlashMessage};
use crate::views::auth::{login_page as render_login, register_page as render_register};
use crate::views::Page;

const INVALID_LOGIN: &str =
    "Please enter a correct email and password. Note that both fields may be case-sensitive.";
const DUPLICATE_EMAIL: &str = "A user with that email already exists.";

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Accepts only local absolute paths as redirect targets. Browsers drop
/// tabs and newlines from URLs, so any whitespace or control character
/// is refused before the `//` check.
pub fn safe_next(next: Option<&str>) -> Option<&str> {
    next.filter(|n| {
        n.starts_with('/')
            && !n.starts_with("//")
            && !n.contains('\\')
            && !n.chars().any(|c| c.is_control() || c.is_whitespace())
    })
}

/// Opens a session for `user_id` and returns its Set-Cookie value.
async fn start_session(state: &AppState, user_id: Uuid) -> Result<String, AppError> {
    let users = UserRepository::new(state.pool.clone());
    let token = generate_session_token();
    let now = Utc::now();
    let expires_at = now + Duration::hours(state.config.security.session_ttl_hours);

    users
        .create_session(user_id, &sha256_hex(&token), expires_at)
        .await?;
    users.update_last_login(user_id, now).await?;
    let purged = users.delete_expired_sessions(user_id).await?;
    if purged > 0 {
        tracing::debug!(user_id = %user_id, purged, "Removed expired sessions");
    }

    Ok(state.cookies.build_session_cookie(&token))
}

fn with_cookie(mut response: Response, cookie: &str) -> Response {
    CookieHelper::append(response.headers_mut(), cookie);
    response
}

/// `/` sends visitors to their dashboard or the login form.
pub async fn index(MaybeUser(user): MaybeUser) -> Response {
    match user {
        Some(_) => see_other("/dashboard"),
        None => see_other("/login"),
    }
}

pub async fn login_page(
    page: Page,
    MaybeUser(user): MaybeUser,
    Query(query): Query<NextQuery>,
) -> Response {
    let next = safe_next(query.next.as_deref()).map(str::to_string);
    if user.is_some() {
        return see_other(next.as_deref().unwrap_or("/dashboard"));
    }
    let form = LoginForm {
        next,
        ..Default::default()
    };
    render_login(&page, &form, &FormErrors::new()).into_response()
}

pub async fn login(
    State(state): State<AppState>,
    page: Page,
    CsrfForm(form): CsrfForm<LoginForm>,
) -> Result<Response, AppError> {
    let (email, password) = match form.clean() {
        Ok(credentials) => credentials,
        Err(errors) => {
            return Ok(
                (StatusCode::UNPROCESSABLE_ENTITY, render_login(&page, &form, &errors))
                    .into_response(),
            )
        }
    };

    if let Some(limiter) = &state.login_limiter {
        if let Err(retry_after) = limiter.check(&email) {
            warn!(email = %email, retry_after, "Login rate limit exceeded");
            let mut errors = FormErrors::new();
            errors.add_non_field("Too many login attempts. Please try again later.");
            let mut response =
                (StatusCode::TOO_MANY_REQUESTS, render_login(&page, &form, &errors))
                    .into_response();
            if let Ok(value) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
            return Ok(response);
        }
    }

    let users = UserRepository::new(state.pool.clone());
    let user: Option<User> = users.find_by_email(&email).await?.map(Into::into);
    let authenticated = match &user {
        Some(user) if user.is_active => verify_password(&password, &user.password_hash)?,
        _ => false,
    };

    let user = match user {
        Some(user) if authenticated => user,
        _ => {
            record_login(false);
            info!(email = %email, "Failed login attempt");
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                render_login(&page, &form, &FormErrors::single(NON_FIELD_ERRORS, INVALID_LOGIN)),
            )
                .into_response());
        }
    };

    let cookie = start_session(&state, user.id).await?;
    record_login(true);
    info!(user_id = %user.id, role = %user.role, "User logged in");

    let target = safe_next(form.next.as_deref()).unwrap_or("/dashboard");
    Ok(with_cookie(see_other(target), &cookie))
}

pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    CsrfForm(_): CsrfForm<NoFields>,
) -> Result<Response, AppError> {
    if let Some(token) = CookieHelper::extract_cookie(&headers, SESSION_COOKIE) {
        UserRepository::new(state.pool.clone())
            .delete_session_by_token(&sha256_hex(token))
            .await?;
    }

    let response = redirect(
        &state.cookies,
        "/login",
        FlashMessage::info("You have been logged out."),
    );
    Ok(with_cookie(
        response,
        &state.cookies.build_clear_session_cookie(),
    ))
}

pub async fn register_page(page: Page, MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return see_other("/dashboard");
    }
    render_register(&page, &RegisterForm::default(), &FormErrors::new()).into_response()
}

pub async fn register(
    State(state): State<AppState>,
    page: Page,
    CsrfForm(form): CsrfForm<RegisterForm>,
) -> Result<Response, AppError> {
    let invalid = |errors: FormErrors| {
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            render_register(&page, &form, &errors),
        )
            .into_response()
    };

    let registration = match form.clean() {
        Ok(registration) => registration,
        Err(errors) => return Ok(invalid(errors)),
    };

    let users = UserRepository::new(state.pool.clone());
    if users.find_by_email(&registration.email).await?.is_some() {
        return Ok(invalid(FormErrors::single("email", DUPLICATE_EMAIL)));
    }

    let password_hash = hash_password(&registration.password)?;
    let user = match users
        .create_with_profile(&registration.email, &password_hash, registration.role)
        .await
    {
        Ok(user) => user,
        Err(e) if is_unique_violation(&e) => {
            return Ok(invalid(FormErrors::single("email", DUPLICATE_EMAIL)))
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = %user.id, role = %registration.role, "Account registered");
    let cookie = start_session(&state, user.id).await?;
    let response = redirect(
        &state.cookies,
        "/dashboard",
        FlashMessage::success(format!("Account created for {}!", registration.email)),
    );
    Ok(with_cookie(response, &cookie))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_next_accepts_local_paths() {
        assert_eq!(safe_next(Some("/messages")), Some("/messages"));
        assert_eq!(safe_next(Some("/properties?x=1")), Some("/properties?x=1"));
    }

    #[test]
    fn test_safe_next_rejects_external_targets() {
        assert_eq!(safe_next(Some("https://evil.example")), None);
        assert_eq!(safe_next(Some("//evil.example")), None);
        assert_eq!(safe_next(Some("/\\evil.example")), None);
        assert_eq!(safe_next(Some("/\t/evil.example")), None);
        assert_eq!(safe_next(Some("/\n/evil.example")), None);
        assert_eq!(safe_next(Some("/ /evil.example")), None);
        assert_eq!(safe_next(None), None);
    }
}
