use axum::response::Html;
use domain::models::{AdminDashboard, Dashboard, LandlordDashboard, TenantDashboard};
use shared::html::escape;

use super::components::date;
use super::layout::{render, Page};

fn stat(label: &str, value: i64, href: &str) -> String {
    format!(
        r#"<a class="stat" href="{}"><span class="stat-value">{}</span><span class="stat-label">{}</span></a>"#,
        href, value, label
    )
}

fn landlord(summary: &LandlordDashboard) -> String {
    let overdue = if summary.overdue_reminders.is_empty() {
        "<p>No overdue reminders.</p>".to_string()
    } else {
        let items: String = summary
            .overdue_reminders
            .iter()
            .map(|r| {
                format!(
                    r#"<li><span class="badge badge-danger">Overdue</span> {} ({}), due {}</li>"#,
                    escape(&r.reminder.title),
                    escape(&r.property_address),
                    date(&r.reminder.due_date)
                )
            })
            .collect();
        format!("<ul>{}</ul>", items)
    };

    format!(
        r#"<div class="stats">{}{}{}</div><h2>Overdue reminders</h2>{}"#,
        stat("Properties", summary.property_count, "/properties"),
        stat(
            "Pending invitations",
            summary.pending_invitation_count,
            "/invitations"
        ),
        stat("Unread messages", summary.unread_message_count, "/messages"),
        overdue
    )
}

fn tenant(summary: &TenantDashboard) -> String {
    let landlords = if summary.landlords.is_empty() {
        "<p>You have not accepted any invitations yet.</p>".to_string()
    } else {
        let items: String = summary
            .landlords
            .iter()
            .map(|l| {
                format!(
                    r#"<li><strong>{}</strong> &lt;{}&gt;<br>{}</li>"#,
                    escape(&l.name),
                    escape(&l.email),
                    escape(&l.contact_info)
                )
            })
            .collect();
        format!("<ul>{}</ul>", items)
    };

    format!(
        r#"<div class="stats">{}</div><h2>Your landlords</h2>{}"#,
        stat("Unread messages", summary.unread_message_count, "/messages"),
        landlords
    )
}

fn administrator(summary: &AdminDashboard) -> String {
    format!(
        r#"<div class="stats">{}{}{}</div>"#,
        stat("Users", summary.user_count, "/dashboard"),
        stat("Properties", summary.property_count, "/properties"),
        stat("Unread messages", summary.unread_message_count, "/messages"),
    )
}

pub fn dashboard_page(page: &Page, dashboard: &Dashboard) -> Html<String> {
    let body = match dashboard {
        Dashboard::Landlord(summary) => landlord(summary),
        Dashboard::Tenant(summary) => tenant(summary),
        Dashboard::Administrator(summary) => administrator(summary),
    };
    render(page, "Dashboard", &body)
}
