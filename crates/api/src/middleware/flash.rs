//! Flash message middleware.
//!
//! Decodes the `flash` cookie into [`IncomingFlash`] for the page renderer.
//! Once a non-redirect response has gone out the cookie is cleared, unless
//! the handler queued a new message.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::app::AppState;
use crate::services::cookies::{CookieHelper, FLASH_COOKIE};
use crate::services::flash::{decode, IncomingFlash};

pub async fn flash_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let incoming = CookieHelper::extract_cookie(req.headers(), FLASH_COOKIE)
        .map(decode)
        .unwrap_or_default();
    let had_flash = !incoming.is_empty();

    req.extensions_mut().insert(IncomingFlash(incoming));
    let mut response = next.run(req).await;

    let replaced = CookieHelper::is_set(response.headers(), FLASH_COOKIE);
    if had_flash && !replaced && !response.status().is_redirection() {
        CookieHelper::append(
            response.headers_mut(),
            &state.cookies.build_clear_flash_cookie(),
        );
    }

    response
}
