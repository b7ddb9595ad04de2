//! Request ID middleware.
//!
//! Reuses a sane incoming `X-Request-ID` or generates a UUID v4, runs the
//! request inside a span carrying it and echoes it on the response.

use axum::{
    body::Body,
    http::{header::HeaderName, HeaderValue, Request},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Longest client-supplied request ID that is reused.
const MAX_REQUEST_ID_LEN: usize = 128;

/// Request ID stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

fn incoming_request_id(req: &Request<Body>) -> Option<String> {
    req.headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= MAX_REQUEST_ID_LEN)
        .filter(|s| s.chars().all(|c| c.is_ascii_graphic()))
        .map(str::to_string)
}

pub async fn trace_id(mut req: Request<Body>, next: Next) -> Response {
    let request_id = incoming_request_id(&req).unwrap_or_else(|| Uuid::new_v4().to_string());

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let start = std::time::Instant::now();
        let mut response = next.run(req).await;

        tracing::info!(
            status = response.status().as_u16(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Request completed"
        );

        if let Ok(header_value) = HeaderValue::from_str(&request_id) {
            response
                .headers_mut()
                .insert(HeaderName::from_static("x-request-id"), header_value);
        }
        response
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(id: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri("/");
        if let Some(id) = id {
            builder = builder.header(REQUEST_ID_HEADER, id);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_incoming_id_reused() {
        assert_eq!(
            incoming_request_id(&request_with(Some("req-123_abc.xyz"))),
            Some("req-123_abc.xyz".to_string())
        );
    }

    #[test]
    fn test_missing_or_bad_id_ignored() {
        assert_eq!(incoming_request_id(&request_with(None)), None);
        assert_eq!(incoming_request_id(&request_with(Some(""))), None);
        assert_eq!(incoming_request_id(&request_with(Some("has space"))), None);
        let long = "x".repeat(MAX_REQUEST_ID_LEN + 1);
        assert_eq!(incoming_request_id(&request_with(Some(&long))), None);
    }
}
