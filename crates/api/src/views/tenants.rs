use axum::response::Html;
use domain::models::Contact;
use shared::html::escape;

use super::layout::{render, Page};

pub fn tenants_page(page: &Page, tenants: &[Contact]) -> Html<String> {
    let body = if tenants.is_empty() {
        r#"<p>No tenants yet. <a href="/invitations">Invite one</a>.</p>"#.to_string()
    } else {
        let rows: String = tenants
            .iter()
            .map(|t| {
                format!(
                    r#"<tr><td>{}</td><td>{}</td><td>{}</td><td><a href="/messages/conversation/{}">Message</a></td></tr>"#,
                    escape(&t.name),
                    escape(&t.email),
                    escape(&t.contact_info),
                    t.user_id
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Name</th><th>Email</th><th>Contact</th><th></th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };
    render(page, "Tenants", &body)
}
