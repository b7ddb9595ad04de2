use axum::response::Html;
use domain::models::lease::RentalAgreementForm;
use domain::models::{AgreementSummary, Contact, FormErrors, Property};
use shared::html::escape;
use uuid::Uuid;

use super::components::{csrf_field, input, money, non_field_errors, post_button, select};
use super::layout::{render, Page};

/// Properties and tenants a landlord may put on an agreement.
#[derive(Debug, Clone, Default)]
pub struct AgreementChoices {
    pub properties: Vec<Property>,
    /// Tenants who accepted one of the landlord's invitations.
    pub tenants: Vec<Contact>,
}

impl AgreementChoices {
    pub fn property_ids(&self) -> Vec<Uuid> {
        self.properties.iter().map(|p| p.id).collect()
    }

    pub fn tenant_ids(&self) -> Vec<Uuid> {
        self.tenants.iter().map(|t| t.user_id).collect()
    }
}

fn agreement_fields(
    choices: &AgreementChoices,
    form: &RentalAgreementForm,
    errors: &FormErrors,
) -> String {
    let properties: Vec<(String, String)> = choices
        .properties
        .iter()
        .map(|p| (p.id.to_string(), p.display_address()))
        .collect();
    let tenants: Vec<(String, String)> = choices
        .tenants
        .iter()
        .map(|t| {
            let label = if t.name.trim().is_empty() {
                t.email.clone()
            } else {
                format!("{} ({})", t.name, t.email)
            };
            (t.user_id.to_string(), label)
        })
        .collect();
    [
        select("property_id", "Property", &properties, &form.property_id, errors),
        select("tenant_id", "Tenant", &tenants, &form.tenant_id, errors),
        input("date", "start_date", "Start date", &form.start_date, errors),
        input("date", "end_date", "End date", &form.end_date, errors),
        input("text", "base_rent", "Base rent", &form.base_rent, errors),
        input("text", "coop_fee", "Cooperative fee", &form.coop_fee, errors),
        input("text", "electricity", "Electricity", &form.electricity, errors),
        input("text", "gas", "Gas", &form.gas, errors),
        input("text", "other_fees", "Other fees", &form.other_fees, errors),
    ]
    .concat()
}

pub fn list_page(
    page: &Page,
    agreements: &[AgreementSummary],
    choices: &AgreementChoices,
    form: &RentalAgreementForm,
    errors: &FormErrors,
) -> Html<String> {
    let table = if agreements.is_empty() {
        "<p>No rental agreements.</p>".to_string()
    } else {
        let rows: String = agreements
            .iter()
            .map(|summary| {
                let a = &summary.agreement;
                format!(
                    r#"<tr><td>{property}</td><td>{tenant}</td><td>{period}</td><td>{rent}</td><td>{total}</td><td><a class="btn btn-small" href="/agreements/{id}/edit">Edit</a>{delete}</td></tr>"#,
                    property = escape(&summary.property_address),
                    tenant = escape(summary.tenant_display()),
                    period = escape(&a.period_display()),
                    rent = money(a.base_rent),
                    total = money(a.monthly_total()),
                    id = a.id,
                    delete = post_button(
                        &format!("/agreements/{}/delete", a.id),
                        &page.csrf_token,
                        "Delete",
                        "btn btn-small btn-danger"
                    ),
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Property</th><th>Tenant</th><th>Period</th><th>Base rent</th><th>Monthly total</th><th></th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    let create = if choices.properties.is_empty() || choices.tenants.is_empty() {
        r#"<p>An agreement needs one of your <a href="/properties">properties</a> and a tenant who accepted an <a href="/invitations">invitation</a>.</p>"#
            .to_string()
    } else {
        format!(
            r#"<h2>New agreement</h2><form method="post" action="/agreements" class="card">{}{}{}<button type="submit" class="btn btn-primary">Add agreement</button></form>"#,
            csrf_field(&page.csrf_token),
            non_field_errors(errors),
            agreement_fields(choices, form, errors)
        )
    };

    render(page, "Rental agreements", &format!("{}{}", table, create))
}

pub fn edit_page(
    page: &Page,
    agreement_id: Uuid,
    choices: &AgreementChoices,
    form: &RentalAgreementForm,
    errors: &FormErrors,
) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/agreements/{}" class="card">{}{}{}<button type="submit" class="btn btn-primary">Save</button> <a href="/agreements">Cancel</a></form>"#,
        agreement_id,
        csrf_field(&page.csrf_token),
        non_field_errors(errors),
        agreement_fields(choices, form, errors)
    );
    render(page, "Edit rental agreement", &body)
}
