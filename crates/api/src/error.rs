use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use shared::html::encode_query_value;
use shared::password::PasswordError;
use thiserror::Error;

use crate::services::flash::see_other;
use crate::views::errors::error_page;

/// Errors a handler can bail out with. Each renders an HTML page, except
/// `LoginRequired` which redirects to the login form.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Login required")]
    LoginRequired { next: Option<String> },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("CSRF verification failed")]
    CsrfFailed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn forbidden() -> Self {
        AppError::Forbidden("You do not have permission to access this page.".into())
    }

    pub fn not_found() -> Self {
        AppError::NotFound("The page you requested does not exist.".into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::LoginRequired { .. } => StatusCode::SEE_OTHER,
            AppError::Forbidden(_) | AppError::CsrfFailed => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// `/login`, carrying the page to come back to.
pub fn login_url(next: Option<&str>) -> String {
    match next {
        Some(next) => format!("/login?next={}", encode_query_value(next)),
        None => "/login".to_string(),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            AppError::LoginRequired { next } => return see_other(&login_url(next.as_deref())),
            AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::BadRequest(msg) => msg,
            AppError::CsrfFailed => {
                "CSRF verification failed. Reload the form and try again.".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred.".to_string()
            }
        };

        (status, Html(error_page(status, &message))).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::not_found(),
            sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
                Some("23505") => AppError::Conflict("That record already exists.".into()),
                Some("23503") => AppError::NotFound("Referenced record not found.".into()),
                _ => AppError::Internal(format!("Database error: {}", db_err)),
            },
            _ => AppError::Internal(format!("Database error: {}", err)),
        }
    }
}

impl From<PasswordError> for AppError {
    fn from(err: PasswordError) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// True for a unique-constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header;

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_login_required_redirects_with_next() {
        let response = AppError::LoginRequired {
            next: Some("/properties?page=2".to_string()),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers()[header::LOCATION],
            "/login?next=/properties%3Fpage%3D2"
        );
    }

    #[test]
    fn test_login_required_without_next() {
        let response = AppError::LoginRequired { next: None }.into_response();
        assert_eq!(response.headers()[header::LOCATION], "/login");
    }

    #[tokio::test]
    async fn test_forbidden_renders_html() {
        let response = AppError::forbidden().into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_text(response).await;
        assert!(body.contains("<!DOCTYPE html>"));
        assert!(body.contains("You do not have permission"));
    }

    #[tokio::test]
    async fn test_internal_hides_details() {
        let response = AppError::Internal("connection refused to 10.0.0.1".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_text(response).await;
        assert!(!body.contains("10.0.0.1"));
        assert!(body.contains("An internal error occurred."));
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::CsrfFailed.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::not_found().status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::Conflict("x".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::BadRequest("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_from_sqlx_row_not_found() {
        let error: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(error, AppError::NotFound(_)));
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
    }
}
