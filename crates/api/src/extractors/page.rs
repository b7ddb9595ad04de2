use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use super::session::load;
use crate::app::AppState;
use crate::error::AppError;
use crate::middleware::csrf::{form_token, CsrfNonce};
use crate::services::flash::IncomingFlash;
use crate::views::layout::{NavUser, Page};

#[async_trait]
impl FromRequestParts<AppState> for Page {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let csrf_token = parts
            .extensions
            .get::<CsrfNonce>()
            .map(|CsrfNonce(nonce)| form_token(&state.config.security.csrf_secret, nonce))
            .unwrap_or_default();
        let flashes = parts
            .extensions
            .get::<IncomingFlash>()
            .map(|IncomingFlash(messages)| messages.clone())
            .unwrap_or_default();
        let user = load(parts, state).await?.map(|current| NavUser {
            email: current.user.email,
            role: current.user.role,
            unread_messages: current.unread_messages,
        });

        Ok(Page {
            csrf_token,
            flashes,
            user,
        })
    }
}
