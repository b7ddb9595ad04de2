//! CSRF nonce middleware.
//!
//! Every browser carries a random nonce in the `csrftoken` cookie. Forms
//! embed `HMAC-SHA256(csrf_secret, nonce)` and the `CsrfForm` extractor
//! checks it on submission.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use shared::crypto::generate_token;

use crate::app::AppState;
use crate::services::cookies::{CookieHelper, CSRF_COOKIE};

/// Random bytes in a nonce.
pub const CSRF_NONCE_BYTES: usize = 32;

/// The browser's nonce, stored in request extensions.
#[derive(Debug, Clone)]
pub struct CsrfNonce(pub String);

/// Token to embed in forms for this nonce.
pub fn form_token(secret: &str, nonce: &str) -> String {
    shared::crypto::hmac_sha256_hex(secret.as_bytes(), nonce)
}

pub fn verify_form_token(secret: &str, nonce: &str, token: &str) -> bool {
    shared::crypto::verify_hmac_sha256_hex(secret.as_bytes(), nonce, token)
}

fn is_well_formed(nonce: &str) -> bool {
    (32..=128).contains(&nonce.len())
        && nonce
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

pub async fn csrf_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let existing = CookieHelper::extract_cookie(req.headers(), CSRF_COOKIE)
        .filter(|nonce| is_well_formed(nonce))
        .map(str::to_string);

    let (nonce, issued) = match existing {
        Some(nonce) => (nonce, false),
        None => (generate_token(CSRF_NONCE_BYTES), true),
    };

    req.extensions_mut().insert(CsrfNonce(nonce.clone()));
    let mut response = next.run(req).await;

    if issued {
        CookieHelper::append(
            response.headers_mut(),
            &state.cookies.build_csrf_cookie(&nonce),
        );
    }

    response
}
