//! Profile page: account data, role profile and, for landlords, their
//! properties and reminders.

use axum::response::Html;
use chrono::{DateTime, Utc};
use domain::models::user::ProfileForm;
use domain::models::{
    FormErrors, LandlordProfile, Property, ReminderSummary, TenantProfile, User,
};
use shared::html::escape;

use super::components::{csrf_field, date, input, money, non_field_errors, textarea};
use super::layout::{render, Page};

/// Role-specific data shown on the profile page.
#[derive(Debug, Clone)]
pub enum ProfileDetails {
    Landlord {
        profile: LandlordProfile,
        properties: Vec<Property>,
        reminders: Vec<ReminderSummary>,
    },
    Tenant {
        profile: TenantProfile,
    },
    Administrator,
}

fn edit_form(page: &Page, form: &ProfileForm, errors: &FormErrors, landlord: bool) -> String {
    let country = if landlord {
        input(
            "text",
            "tax_residency_country",
            "Tax residency country",
            form.tax_residency_country.as_deref().unwrap_or(""),
            errors,
        )
    } else {
        String::new()
    };
    format!(
        r#"<h2>Edit profile</h2><form method="post" action="/profile" class="card">{}{}{}{}{}<button type="submit" class="btn btn-primary">Save</button></form>"#,
        csrf_field(&page.csrf_token),
        non_field_errors(errors),
        input("text", "name", "Name", &form.name, errors),
        textarea("contact_info", "Contact information", &form.contact_info, errors),
        country,
    )
}

fn landlord_sections(
    properties: &[Property],
    reminders: &[ReminderSummary],
    now: DateTime<Utc>,
) -> String {
    let properties = if properties.is_empty() {
        "<p>No properties yet.</p>".to_string()
    } else {
        let rows: String = properties
            .iter()
            .map(|p| {
                format!(
                    r#"<tr><td><a href="/properties/{}">{}</a></td><td>{}</td><td>{}</td></tr>"#,
                    p.id,
                    escape(&p.display_address()),
                    p.status.label(),
                    money(p.total_monthly_cost())
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Address</th><th>Status</th><th>Monthly cost</th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    let reminders = if reminders.is_empty() {
        "<p>No reminders.</p>".to_string()
    } else {
        let rows: String = reminders
            .iter()
            .map(|r| {
                let badge = r.reminder.badge(now);
                format!(
                    r#"<tr><td>{}</td><td>{}</td><td>{}</td><td><span class="{}">{}</span></td></tr>"#,
                    escape(&r.reminder.title),
                    escape(&r.property_address),
                    date(&r.reminder.due_date),
                    badge.css_class(),
                    badge.label()
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Title</th><th>Property</th><th>Due</th><th>State</th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    format!(
        "<h2>Your properties</h2>{}<h2>Your reminders</h2>{}",
        properties, reminders
    )
}

pub fn profile_page(
    page: &Page,
    user: &User,
    details: &ProfileDetails,
    form: &ProfileForm,
    errors: &FormErrors,
    now: DateTime<Utc>,
) -> Html<String> {
    let account = format!(
        r#"<dl class="card"><dt>Email</dt><dd>{}</dd><dt>Role</dt><dd>{}</dd><dt>Member since</dt><dd>{}</dd></dl>"#,
        escape(&user.email),
        user.role.label(),
        date(&user.created_at)
    );

    let role_body = match details {
        ProfileDetails::Landlord {
            profile,
            properties,
            reminders,
        } => format!(
            r#"<dl class="card"><dt>Name</dt><dd>{}</dd><dt>Contact</dt><dd>{}</dd><dt>Tax residency</dt><dd>{}</dd></dl>{}{}"#,
            escape(&profile.name),
            escape(&profile.contact_info),
            escape(&profile.tax_residency_country),
            edit_form(page, form, errors, true),
            landlord_sections(properties, reminders, now)
        ),
        ProfileDetails::Tenant { profile } => format!(
            r#"<dl class="card"><dt>Name</dt><dd>{}</dd><dt>Contact</dt><dd>{}</dd></dl>{}"#,
            escape(&profile.name),
            escape(&profile.contact_info),
            edit_form(page, form, errors, false)
        ),
        ProfileDetails::Administrator => {
            "<p>Administrators do not have an editable profile.</p>".to_string()
        }
    };

    render(page, "Profile", &format!("{}{}", account, role_body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::models::{Reminder, UserRole};
    use uuid::Uuid;

    fn user(role: UserRole) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "jan@example.com".to_string(),
            password_hash: String::new(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    fn landlord_details(reminder_due_in_days: i64) -> ProfileDetails {
        let now = Utc::now();
        let owner = Uuid::new_v4();
        ProfileDetails::Landlord {
            profile: LandlordProfile {
                user_id: owner,
                name: "Jan Kowalski".to_string(),
                contact_info: "+48 600 000 000".to_string(),
                tax_residency_country: "PL".to_string(),
                created_at: now,
                updated_at: now,
            },
            properties: vec![],
            reminders: vec![ReminderSummary {
                reminder: Reminder {
                    id: Uuid::new_v4(),
                    property_id: Uuid::new_v4(),
                    title: "Boiler service".to_string(),
                    description: String::new(),
                    due_date: now + Duration::days(reminder_due_in_days),
                    is_completed: false,
                    created_at: now,
                    updated_at: now,
                },
                property_address: "Długa 5".to_string(),
            }],
        }
    }

    #[test]
    fn test_landlord_profile_marks_overdue_reminders() {
        let Html(html) = profile_page(
            &Page::default(),
            &user(UserRole::Landlord),
            &landlord_details(-2),
            &ProfileForm::default(),
            &FormErrors::new(),
            Utc::now(),
        );
        assert!(html.contains("Landlord"));
        assert!(html.contains(r#"<span class="badge badge-danger">Overdue</span>"#));
        assert!(html.contains(r#"name="tax_residency_country""#));
    }

    #[test]
    fn test_administrator_has_no_form() {
        let Html(html) = profile_page(
            &Page::default(),
            &user(UserRole::Administrator),
            &ProfileDetails::Administrator,
            &ProfileForm::default(),
            &FormErrors::new(),
            Utc::now(),
        );
        assert!(!html.contains(r#"action="/profile""#));
    }
}
