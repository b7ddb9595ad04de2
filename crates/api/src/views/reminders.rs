use axum::response::Html;
use chrono::{DateTime, Utc};
use domain::models::reminder::ReminderForm;
use domain::models::{FormErrors, Property, ReminderSummary};
use shared::html::escape;
use uuid::Uuid;

use super::components::{csrf_field, date, input, non_field_errors, post_button, select, textarea};
use super::layout::{render, Page};

fn reminder_fields(properties: &[Property], form: &ReminderForm, errors: &FormErrors) -> String {
    let options: Vec<(String, String)> = properties
        .iter()
        .map(|p| (p.id.to_string(), p.display_address()))
        .collect();
    [
        input("text", "title", "Title", &form.title, errors),
        textarea("description", "Description", &form.description, errors),
        input("date", "due_date", "Due date", &form.due_date, errors),
        select("property_id", "Property", &options, &form.property_id, errors),
    ]
    .concat()
}

pub fn list_page(
    page: &Page,
    reminders: &[ReminderSummary],
    properties: &[Property],
    form: &ReminderForm,
    errors: &FormErrors,
    now: DateTime<Utc>,
) -> Html<String> {
    let table = if reminders.is_empty() {
        "<p>No reminders.</p>".to_string()
    } else {
        let rows: String = reminders
            .iter()
            .map(|summary| {
                let reminder = &summary.reminder;
                let badge = reminder.badge(now);
                let toggle_label = if reminder.is_completed {
                    "Reopen"
                } else {
                    "Mark done"
                };
                format!(
                    r#"<tr><td>{title}</td><td>{property}</td><td>{due}</td><td><span class="{class}">{label}</span></td><td>{toggle}<a class="btn btn-small" href="/reminders/{id}/edit">Edit</a>{delete}</td></tr>"#,
                    title = escape(&reminder.title),
                    property = escape(&summary.property_address),
                    due = date(&reminder.due_date),
                    class = badge.css_class(),
                    label = badge.label(),
                    toggle = post_button(
                        &format!("/reminders/{}/toggle", reminder.id),
                        &page.csrf_token,
                        toggle_label,
                        "btn btn-small"
                    ),
                    id = reminder.id,
                    delete = post_button(
                        &format!("/reminders/{}/delete", reminder.id),
                        &page.csrf_token,
                        "Delete",
                        "btn btn-small btn-danger"
                    ),
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Title</th><th>Property</th><th>Due</th><th>State</th><th></th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    let create = if properties.is_empty() {
        r#"<p>Add a <a href="/properties/new">property</a> before creating reminders.</p>"#
            .to_string()
    } else {
        format!(
            r#"<h2>New reminder</h2><form method="post" action="/reminders" class="card">{}{}{}<button type="submit" class="btn btn-primary">Add reminder</button></form>"#,
            csrf_field(&page.csrf_token),
            non_field_errors(errors),
            reminder_fields(properties, form, errors)
        )
    };

    render(page, "Reminders", &format!("{}{}", table, create))
}

pub fn edit_page(
    page: &Page,
    reminder_id: Uuid,
    properties: &[Property],
    form: &ReminderForm,
    errors: &FormErrors,
) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/reminders/{}" class="card">{}{}{}<button type="submit" class="btn btn-primary">Save</button> <a href="/reminders">Cancel</a></form>"#,
        reminder_id,
        csrf_field(&page.csrf_token),
        non_field_errors(errors),
        reminder_fields(properties, form, errors)
    );
    render(page, "Edit reminder", &body)
}
