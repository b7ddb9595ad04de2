//! Page chrome: head, navigation bar, flash messages.

use axum::response::Html;
use domain::models::UserRole;
use shared::html::escape;

use super::components::csrf_field;
use crate::services::flash::FlashMessage;

/// The logged-in user as the navigation bar needs them.
#[derive(Debug, Clone)]
pub struct NavUser {
    pub email: String,
    pub role: UserRole,
    pub unread_messages: i64,
}

/// Per-request rendering context. Extracted in `extractors::page`.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub csrf_token: String,
    pub flashes: Vec<FlashMessage>,
    pub user: Option<NavUser>,
}

fn nav(page: &Page) -> String {
    let Some(user) = &page.user else {
        return r#"<a href="/login">Log in</a><a href="/register">Register</a>"#.to_string();
    };

    let mut links = vec![r#"<a href="/dashboard">Dashboard</a>"#.to_string()];
    match user.role {
        UserRole::Landlord => {
            links.push(r#"<a href="/properties">Properties</a>"#.to_string());
            links.push(r#"<a href="/invitations">Invitations</a>"#.to_string());
            links.push(r#"<a href="/reminders">Reminders</a>"#.to_string());
            links.push(r#"<a href="/tenants">Tenants</a>"#.to_string());
            links.push(r#"<a href="/agreements">Agreements</a>"#.to_string());
            links.push(r#"<a href="/payments">Payments</a>"#.to_string());
        }
        UserRole::Administrator => {
            links.push(r#"<a href="/properties">Properties</a>"#.to_string());
        }
        UserRole::Tenant => {
            links.push(r#"<a href="/payments/my">My payments</a>"#.to_string());
        }
    }
    let unread = if user.unread_messages > 0 {
        format!(r#" <span class="badge badge-info">{}</span>"#, user.unread_messages)
    } else {
        String::new()
    };
    links.push(format!(r#"<a href="/messages">Messages{}</a>"#, unread));
    links.push(r#"<a href="/profile">Profile</a>"#.to_string());
    links.push(format!(
        r#"<span class="whoami">{} ({})</span><form method="post" action="/logout" class="inline">{}<button type="submit" class="link">Log out</button></form>"#,
        escape(&user.email),
        user.role.label(),
        csrf_field(&page.csrf_token)
    ));
    links.concat()
}

fn flashes(page: &Page) -> String {
    page.flashes
        .iter()
        .map(|f| {
            format!(
                r#"<div class="{}">{}</div>"#,
                f.level.css_class(),
                escape(&f.message)
            )
        })
        .collect()
}

fn document(title: &str, nav: &str, flashes: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Property Manager</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header><a class="brand" href="/">Property Manager</a><nav>{nav}</nav></header>
<main>
{flashes}
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
        nav = nav,
        flashes = flashes,
        body = body,
    )
}

/// Full page with navigation and pending flash messages.
pub fn render(page: &Page, title: &str, body: &str) -> Html<String> {
    Html(document(title, &nav(page), &flashes(page), body))
}

/// Page without a request context, for error responses.
pub fn render_bare(title: &str, body: &str) -> String {
    document(title, r#"<a href="/">Home</a>"#, "", body)
}
