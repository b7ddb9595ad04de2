use axum::response::Html;
use chrono::{DateTime, Utc};
use domain::models::invitation::InvitationForm;
use domain::models::{FormErrors, InvitationStatus, InvitationSummary, Property};
use shared::html::escape;

use super::components::{csrf_field, date, datetime, input, non_field_errors, post_button, select};
use super::layout::{render, Page};

fn status_badge(status: InvitationStatus) -> String {
    let class = match status {
        InvitationStatus::Pending => "badge badge-info",
        InvitationStatus::Accepted => "badge badge-success",
        InvitationStatus::Rejected => "badge badge-secondary",
        InvitationStatus::Expired => "badge badge-danger",
    };
    format!(r#"<span class="{}">{}</span>"#, class, status.label())
}

fn property_options(properties: &[Property]) -> Vec<(String, String)> {
    properties
        .iter()
        .map(|p| (p.id.to_string(), p.display_address()))
        .collect()
}

/// The landlord's invitations with the send form on top.
pub fn list_page(
    page: &Page,
    invitations: &[InvitationSummary],
    properties: &[Property],
    form: &InvitationForm,
    errors: &FormErrors,
    now: DateTime<Utc>,
) -> Html<String> {
    let send_form = if properties.is_empty() {
        r#"<p>Add a <a href="/properties/new">property</a> before inviting tenants.</p>"#
            .to_string()
    } else {
        format!(
            r#"<form method="post" action="/invitations" class="card">{}{}{}{}<button type="submit" class="btn btn-primary">Send invitation</button></form>"#,
            csrf_field(&page.csrf_token),
            non_field_errors(errors),
            input("email", "email", "Tenant email", &form.email, errors),
            select(
                "property_id",
                "Property",
                &property_options(properties),
                &form.property_id,
                errors
            ),
        )
    };

    let table = if invitations.is_empty() {
        "<p>No invitations sent yet.</p>".to_string()
    } else {
        let rows: String = invitations
            .iter()
            .map(|summary| {
                let invitation = &summary.invitation;
                let resend = if invitation.can_resend() {
                    post_button(
                        &format!("/invitations/{}/resend", invitation.id),
                        &page.csrf_token,
                        "Resend",
                        "btn btn-small",
                    )
                } else {
                    String::new()
                };
                let cancel = post_button(
                    &format!("/invitations/{}/cancel", invitation.id),
                    &page.csrf_token,
                    "Delete",
                    "btn btn-small btn-danger",
                );
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}{}</td></tr>",
                    escape(&invitation.email),
                    escape(&summary.property_address),
                    status_badge(invitation.effective_status(now)),
                    datetime(&invitation.created_at),
                    date(&invitation.expires_at),
                    resend,
                    cancel
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Email</th><th>Property</th><th>Status</th><th>Sent</th><th>Expires</th><th></th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    render(
        page,
        "Invitations",
        &format!("{}<h2>Sent invitations</h2>{}", send_form, table),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use domain::models::Invitation;
    use uuid::Uuid;

    fn summary(status: InvitationStatus) -> InvitationSummary {
        let now = Utc::now();
        InvitationSummary {
            invitation: Invitation {
                id: Uuid::new_v4(),
                email: "tenant@example.com".to_string(),
                property_id: Uuid::new_v4(),
                landlord_id: Uuid::new_v4(),
                token: Uuid::new_v4(),
                status,
                created_at: now,
                expires_at: now + Duration::days(7),
            },
            property_address: "Długa 5".to_string(),
        }
    }

    #[test]
    fn test_resend_only_for_pending_or_expired() {
        let accepted = summary(InvitationStatus::Accepted);
        let expired = summary(InvitationStatus::Expired);
        let Html(html) = list_page(
            &Page::default(),
            &[accepted.clone(), expired.clone()],
            &[],
            &InvitationForm::default(),
            &FormErrors::new(),
            Utc::now(),
        );
        assert!(!html.contains(&format!("/invitations/{}/resend", accepted.invitation.id)));
        assert!(html.contains(&format!("/invitations/{}/resend", expired.invitation.id)));
        assert!(html.contains(&format!("/invitations/{}/cancel", accepted.invitation.id)));
    }

    #[test]
    fn test_overdue_pending_shown_as_expired() {
        let mut overdue = summary(InvitationStatus::Pending);
        overdue.invitation.expires_at = Utc::now() - Duration::days(1);
        let Html(html) = list_page(
            &Page::default(),
            &[overdue],
            &[],
            &InvitationForm::default(),
            &FormErrors::new(),
            Utc::now(),
        );
        assert!(html.contains(r#"<span class="badge badge-danger">Expired</span>"#));
    }
}
