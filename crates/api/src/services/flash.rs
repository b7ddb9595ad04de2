//! One-shot notices carried across a redirect in a cookie.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{Deserialize, Serialize};

use super::cookies::CookieHelper;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Error,
}

impl FlashLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashLevel::Success => "alert alert-success",
            FlashLevel::Info => "alert alert-info",
            FlashLevel::Error => "alert alert-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

impl FlashMessage {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: FlashLevel::Error,
            message: message.into(),
        }
    }
}

/// Messages read from the incoming request, stored in request extensions.
#[derive(Debug, Clone, Default)]
pub struct IncomingFlash(pub Vec<FlashMessage>);

pub fn encode(messages: &[FlashMessage]) -> String {
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Tampered or stale cookies decode to nothing.
pub fn decode(raw: &str) -> Vec<FlashMessage> {
    URL_SAFE_NO_PAD
        .decode(raw)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

/// 303 redirect to `location`.
pub fn see_other(location: &str) -> Response {
    (StatusCode::SEE_OTHER, [(header::LOCATION, location.to_string())]).into_response()
}

/// 303 redirect that shows `message` on the next page.
pub fn redirect(cookies: &CookieHelper, location: &str, message: FlashMessage) -> Response {
    let mut response = see_other(location);
    CookieHelper::append(
        response.headers_mut(),
        &cookies.build_flash_cookie(&encode(&[message])),
    );
    response
}
