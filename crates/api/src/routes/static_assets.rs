//! Embedded stylesheet and other static files under `/static/`.

use axum::{
    body::Body,
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

/// Files from the assets/static directory, compiled into the binary.
#[derive(Embed)]
#[folder = "assets/static/"]
struct StaticAssets;

/// Serve `/static/*path` from the embedded assets.
pub async fn static_file(Path(path): Path<String>) -> Response {
    match StaticAssets::get(&path) {
        Some(content) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, mime.as_ref())
                .header(header::CACHE_CONTROL, "public, max-age=3600")
                .body(Body::from(content.data.into_owned()))
                .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stylesheet_is_embedded() {
        let css = StaticAssets::get("style.css").expect("style.css embedded");
        assert!(!css.data.is_empty());
    }

    #[tokio::test]
    async fn test_serves_css_with_mime() {
        let response = static_file(Path("style.css".to_string())).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
    }

    #[tokio::test]
    async fn test_unknown_file_is_404() {
        let response = static_file(Path("missing.js".to_string())).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
