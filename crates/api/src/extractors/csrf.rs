//! Form extractors that verify the CSRF token.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Form,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::app::AppState;
use crate::error::AppError;
use crate::middleware::csrf::{verify_form_token, CsrfNonce};

#[derive(Debug, Deserialize)]
struct WithCsrf<T> {
    #[serde(default)]
    csrf_token: String,
    #[serde(flatten)]
    inner: T,
}

/// A urlencoded form whose `csrf_token` field matches the browser's nonce.
///
/// Rejects with [`AppError::CsrfFailed`] before the handler runs.
#[derive(Debug)]
pub struct CsrfForm<T>(pub T);

/// Body of a POST that carries nothing but the CSRF token.
#[derive(Debug, Default, Deserialize)]
pub struct NoFields {}

#[async_trait]
impl<T> FromRequest<AppState> for CsrfForm<T>
where
    T: DeserializeOwned + Send,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let nonce = req.extensions().get::<CsrfNonce>().cloned();

        let Form(WithCsrf { csrf_token, inner }) = Form::<WithCsrf<T>>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        let verified = nonce.is_some_and(|CsrfNonce(nonce)| {
            verify_form_token(&state.config.security.csrf_secret, &nonce, &csrf_token)
        });
        if !verified {
            tracing::warn!("CSRF token missing or invalid");
            return Err(AppError::CsrfFailed);
        }

        Ok(CsrfForm(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::header};
    use domain::models::user::LoginForm;

    fn form_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_token_is_split_from_form_fields() {
        let Form(parsed) = Form::<WithCsrf<LoginForm>>::from_request(
            form_request("csrf_token=abc&email=a%40example.com&password=pw&next=%2Fmessages"),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(parsed.csrf_token, "abc");
        assert_eq!(parsed.inner.email, "a@example.com");
        assert_eq!(parsed.inner.next.as_deref(), Some("/messages"));
    }

    #[tokio::test]
    async fn test_missing_token_defaults_to_empty() {
        let Form(parsed) = Form::<WithCsrf<NoFields>>::from_request(form_request(""), &())
            .await
            .unwrap();
        assert!(parsed.csrf_token.is_empty());
    }
}
