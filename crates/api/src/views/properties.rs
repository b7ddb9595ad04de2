use axum::response::Html;
use domain::models::property::PropertyForm;
use domain::models::{FormErrors, Property, PropertyStatus};
use shared::html::escape;

use super::components::{csrf_field, input, money, non_field_errors, post_button, select};
use super::layout::{render, Page};

fn status_options() -> Vec<(String, String)> {
    PropertyStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), s.label().to_string()))
        .collect()
}

fn property_fields(form: &PropertyForm, errors: &FormErrors) -> String {
    [
        input("text", "address", "Address", &form.address, errors),
        input("text", "city", "City", &form.city, errors),
        input("text", "postal_code", "Postal code", &form.postal_code, errors),
        input("text", "area_m2", "Area (m²)", &form.area_m2, errors),
        input("text", "current_rent", "Current rent", &form.current_rent, errors),
        input(
            "text",
            "additional_costs",
            "Additional costs",
            &form.additional_costs,
            errors,
        ),
        select("status", "Status", &status_options(), &form.status, errors),
    ]
    .concat()
}

pub fn list_page(page: &Page, properties: &[Property], can_create: bool) -> Html<String> {
    let add = if can_create {
        r#"<p><a class="btn btn-primary" href="/properties/new">Add property</a></p>"#
    } else {
        ""
    };

    let table = if properties.is_empty() {
        "<p>No properties found.</p>".to_string()
    } else {
        let rows: String = properties
            .iter()
            .map(|p| {
                format!(
                    r#"<tr><td><a href="/properties/{id}">{address}</a></td><td>{city}</td><td>{area}</td><td>{rent}</td><td>{total}</td><td>{status}</td></tr>"#,
                    id = p.id,
                    address = escape(&p.address),
                    city = escape(&p.city),
                    area = p.area_m2,
                    rent = money(p.current_rent),
                    total = money(p.total_monthly_cost()),
                    status = p.status.label(),
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Address</th><th>City</th><th>Area (m²)</th><th>Rent</th><th>Total monthly</th><th>Status</th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };

    render(page, "Properties", &format!("{}{}", add, table))
}

pub fn new_page(page: &Page, form: &PropertyForm, errors: &FormErrors) -> Html<String> {
    let body = format!(
        r#"<form method="post" action="/properties" class="card">{}{}{}<button type="submit" class="btn btn-primary">Create</button> <a href="/properties">Cancel</a></form>"#,
        csrf_field(&page.csrf_token),
        non_field_errors(errors),
        property_fields(form, errors),
    );
    render(page, "Add property", &body)
}

/// Detail view with the edit form and delete button.
pub fn detail_page(
    page: &Page,
    property: &Property,
    form: &PropertyForm,
    errors: &FormErrors,
) -> Html<String> {
    let body = format!(
        r#"<dl class="card">
<dt>Address</dt><dd>{address}</dd>
<dt>Area</dt><dd>{area} m²</dd>
<dt>Rent</dt><dd>{rent}</dd>
<dt>Additional costs</dt><dd>{costs}</dd>
<dt>Total monthly cost</dt><dd>{total}</dd>
<dt>Status</dt><dd>{status}</dd>
</dl>
<h2>Edit</h2>
<form method="post" action="/properties/{id}" class="card">{csrf}{non_field}{fields}<button type="submit" class="btn btn-primary">Save</button></form>
{delete}
<p><a href="/properties">Back to properties</a></p>"#,
        address = escape(&property.display_address()),
        area = property.area_m2,
        rent = money(property.current_rent),
        costs = money(property.additional_costs),
        total = money(property.total_monthly_cost()),
        status = property.status.label(),
        id = property.id,
        csrf = csrf_field(&page.csrf_token),
        non_field = non_field_errors(errors),
        fields = property_fields(form, errors),
        delete = post_button(
            &format!("/properties/{}/delete", property.id),
            &page.csrf_token,
            "Delete property",
            "btn btn-danger"
        ),
    );
    render(page, &property.address, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn property() -> Property {
        let now = Utc::now();
        Property {
            id: Uuid::new_v4(),
            landlord_id: Uuid::new_v4(),
            address: "Marszałkowska 10".to_string(),
            city: "Warszawa".to_string(),
            postal_code: "00-001".to_string(),
            area_m2: 54.5,
            current_rent: 3200.0,
            additional_costs: 450.5,
            status: PropertyStatus::Rented,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_list_shows_total_cost_and_add_link() {
        let Html(html) = list_page(&Page::default(), &[property()], true);
        assert!(html.contains("3650.50"));
        assert!(html.contains(r#"href="/properties/new""#));

        let Html(admin) = list_page(&Page::default(), &[], false);
        assert!(!admin.contains(r#"href="/properties/new""#));
        assert!(admin.contains("No properties found."));
    }

    #[test]
    fn test_detail_prefills_form() {
        let p = property();
        let form = PropertyForm::from_property(&p);
        let Html(html) = detail_page(&Page::default(), &p, &form, &FormErrors::new());
        assert!(html.contains(r#"<option value="rented" selected>Rented</option>"#));
        assert!(html.contains(&format!(r#"action="/properties/{}/delete""#, p.id)));
    }
}
