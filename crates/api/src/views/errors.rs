use axum::http::StatusCode;
use shared::html::escape;

use super::layout::render_bare;

pub fn error_page(status: StatusCode, message: &str) -> String {
    let title = status.canonical_reason().unwrap_or("Error");
    render_bare(
        title,
        &format!(
            r#"<p class="error-code">{}</p><p>{}</p><p><a href="/">Back to the start page</a></p>"#,
            status.as_u16(),
            escape(message)
        ),
    )
}
