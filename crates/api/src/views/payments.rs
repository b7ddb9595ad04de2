use axum::response::Html;
use chrono::Datelike;
use domain::models::payment::{month_name, PaymentForm};
use domain::models::{
    AgreementSummary, FormErrors, MonthlyPayments, Payment, PaymentStatus, PaymentSummary,
};
use shared::html::escape;

use super::components::{
    checkbox, csrf_field, day, input, money, non_field_errors, post_button, select,
};
use super::layout::{render, Page};

fn payment_fields(
    agreements: &[AgreementSummary],
    form: &PaymentForm,
    errors: &FormErrors,
) -> String {
    let agreement_options: Vec<(String, String)> = agreements
        .iter()
        .map(|a| (a.agreement.id.to_string(), a.choice_label()))
        .collect();
    let status_options: Vec<(String, String)> = PaymentStatus::ALL
        .iter()
        .map(|s| (s.as_str().to_string(), s.label().to_string()))
        .collect();
    let status = if form.status.is_empty() {
        PaymentStatus::default().as_str()
    } else {
        form.status.as_str()
    };
    [
        select(
            "rental_agreement_id",
            "Rental agreement",
            &agreement_options,
            &form.rental_agreement_id,
            errors,
        ),
        input("date", "date_due", "Due date", &form.date_due, errors),
        input("date", "date_paid", "Paid on", &form.date_paid, errors),
        input("text", "base_rent", "Base rent", &form.base_rent, errors),
        input("text", "coop_fee", "Cooperative fee", &form.coop_fee, errors),
        input("text", "electricity", "Electricity", &form.electricity, errors),
        input("text", "gas", "Gas", &form.gas, errors),
        input("text", "other_fees", "Other fees", &form.other_fees, errors),
        select("status", "Status", &status_options, status, errors),
        input("url", "invoice_url", "Invoice URL", &form.invoice_url, errors),
    ]
    .concat()
}

fn invoice_link(payment: &Payment) -> String {
    if payment.invoice_url.is_empty() {
        String::new()
    } else {
        format!(
            r#"<a href="{}" rel="noopener noreferrer">Invoice</a>"#,
            escape(&payment.invoice_url)
        )
    }
}

fn fees(payment: &Payment) -> f64 {
    payment.coop_fee + payment.electricity + payment.gas + payment.other_fees
}

fn month_options() -> Vec<(String, String)> {
    (1..=12)
        .map(|m: u32| (m.to_string(), month_name(m).to_string()))
        .collect()
}

fn report_form(monthly: &MonthlyPayments) -> String {
    let none = FormErrors::new();
    let month = monthly.month.to_string();
    format!(
        r#"<h2>Report</h2><form method="get" action="/payments/report" class="card">{}{}{}{}<button type="submit" class="btn">Download CSV</button></form>"#,
        input("number", "year", "Year", &monthly.year.to_string(), &none),
        select("start_month", "From month", &month_options(), &month, &none),
        select("end_month", "To month", &month_options(), &month, &none),
        checkbox("full_year", "Whole year", false),
    )
}

pub fn monthly_page(page: &Page, monthly: &MonthlyPayments) -> Html<String> {
    let (prev_year, prev_month) = monthly.previous();
    let (next_year, next_month) = monthly.next();
    let toolbar = format!(
        r#"<p><a href="/payments?year={}&amp;month={}">&larr; Previous</a> | <a href="/payments?year={}&amp;month={}">Next &rarr;</a> | <a class="btn btn-primary" href="/payments/new">Add payment</a></p>"#,
        prev_year, prev_month, next_year, next_month
    );
    let summary = format!(
        "<p>Income: <strong>{}</strong> &middot; Tax to pay: <strong>{}</strong></p>",
        money(monthly.total_income),
        money(monthly.total_tax)
    );

    let groups = if monthly.is_empty() {
        "<p>No payments due this month.</p>".to_string()
    } else {
        monthly
            .properties
            .iter()
            .map(|group| {
                let rows: String = group
                    .tenants
                    .iter()
                    .map(|tenant| {
                        let payments: String = tenant
                            .payments
                            .iter()
                            .map(|summary| {
                                let p = &summary.payment;
                                format!(
                                    r#"<tr><td>{due}</td><td>{paid}</td><td>{rent}</td><td>{fees}</td><td>{tax} ({rate})</td><td>{total}</td><td><span class="{class}">{label}</span></td><td>{invoice}</td><td><a class="btn btn-small" href="/payments/{id}/edit">Edit</a>{delete}</td></tr>"#,
                                    due = day(Some(p.date_due)),
                                    paid = day(p.date_paid),
                                    rent = money(p.base_rent),
                                    fees = money(fees(p)),
                                    tax = money(p.tax_amount),
                                    rate = p.tax_rate_display(),
                                    total = money(p.total_amount),
                                    class = p.status.css_class(),
                                    label = p.status.label(),
                                    invoice = invoice_link(p),
                                    id = p.id,
                                    delete = post_button(
                                        &format!("/payments/{}/delete", p.id),
                                        &page.csrf_token,
                                        "Delete",
                                        "btn btn-small btn-danger"
                                    ),
                                )
                            })
                            .collect();
                        format!(
                            r#"<tr class="group"><th colspan="5">{}</th><th colspan="4">{}</th></tr>{}"#,
                            escape(&tenant.tenant),
                            money(tenant.tenant_total),
                            payments
                        )
                    })
                    .collect();
                format!(
                    "<h2>{} <small>{}</small></h2><table><thead><tr><th>Due</th><th>Paid</th><th>Base rent</th><th>Fees</th><th>Tax</th><th>Total</th><th>Status</th><th>Invoice</th><th></th></tr></thead><tbody>{}</tbody></table>",
                    escape(&group.property),
                    money(group.property_total),
                    rows
                )
            })
            .collect()
    };

    let body = format!("{}{}{}{}", toolbar, summary, groups, report_form(monthly));
    render(page, &format!("Payments for {}", monthly.title()), &body)
}

fn prefill_form(agreements: &[AgreementSummary], selected: &str) -> String {
    let options: Vec<(String, String)> = agreements
        .iter()
        .map(|a| (a.agreement.id.to_string(), a.choice_label()))
        .collect();
    format!(
        r#"<form method="get" action="/payments/new" class="card">{}<button type="submit" class="btn">Use agreed amounts</button></form>"#,
        select("agreement", "Prefill from agreement", &options, selected, &FormErrors::new())
    )
}

pub fn new_page(
    page: &Page,
    agreements: &[AgreementSummary],
    form: &PaymentForm,
    errors: &FormErrors,
) -> Html<String> {
    if agreements.is_empty() {
        return render(
            page,
            "New payment",
            r#"<p>Create a <a href="/agreements">rental agreement</a> before booking payments.</p>"#,
        );
    }
    let body = format!(
        r#"{}<form method="post" action="/payments" class="card">{}{}{}<button type="submit" class="btn btn-primary">Add payment</button> <a href="/payments">Cancel</a></form><p>Tax is computed from the base rent when the payment is saved.</p>"#,
        prefill_form(agreements, &form.rental_agreement_id),
        csrf_field(&page.csrf_token),
        non_field_errors(errors),
        payment_fields(agreements, form, errors)
    );
    render(page, "New payment", &body)
}

pub fn edit_page(
    page: &Page,
    payment: &Payment,
    agreements: &[AgreementSummary],
    form: &PaymentForm,
    errors: &FormErrors,
) -> Html<String> {
    let body = format!(
        r#"<p>Current tax: {} ({}) &middot; Total: {}</p><form method="post" action="/payments/{}" class="card">{}{}{}<button type="submit" class="btn btn-primary">Save</button> <a href="/payments?year={}&amp;month={}">Cancel</a></form>"#,
        money(payment.tax_amount),
        payment.tax_rate_display(),
        money(payment.total_amount),
        payment.id,
        csrf_field(&page.csrf_token),
        non_field_errors(errors),
        payment_fields(agreements, form, errors),
        payment.date_due.year(),
        payment.date_due.month(),
    );
    render(page, "Edit payment", &body)
}

pub fn tenant_page(page: &Page, payments: &[PaymentSummary]) -> Html<String> {
    let body = if payments.is_empty() {
        "<p>No payments yet.</p>".to_string()
    } else {
        let rows: String = payments
            .iter()
            .map(|summary| {
                let p = &summary.payment;
                format!(
                    r#"<tr><td>{property}</td><td>{due}</td><td>{paid}</td><td>{rent}</td><td>{fees}</td><td>{total}</td><td><span class="{class}">{label}</span></td><td>{invoice}</td></tr>"#,
                    property = escape(summary.property_display()),
                    due = day(Some(p.date_due)),
                    paid = day(p.date_paid),
                    rent = money(p.base_rent),
                    fees = money(fees(p)),
                    total = money(p.total_amount),
                    class = p.status.css_class(),
                    label = p.status.label(),
                    invoice = invoice_link(p),
                )
            })
            .collect();
        format!(
            "<table><thead><tr><th>Property</th><th>Due</th><th>Paid</th><th>Base rent</th><th>Fees</th><th>Total</th><th>Status</th><th>Invoice</th></tr></thead><tbody>{}</tbody></table>",
            rows
        )
    };
    render(page, "My payments", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn payment(invoice_url: &str) -> Payment {
        let now = Utc::now();
        Payment {
            id: Uuid::new_v4(),
            landlord_id: Uuid::new_v4(),
            rental_agreement_id: Some(Uuid::new_v4()),
            date_due: NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
            date_paid: None,
            base_rent: 3000.0,
            coop_fee: 400.0,
            electricity: 100.0,
            gas: 0.0,
            other_fees: 0.0,
            tax_rate: 0.085,
            tax_amount: 255.0,
            total_amount: 3755.0,
            status: PaymentStatus::Overdue,
            invoice_url: invoice_url.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn summary(payment: Payment) -> PaymentSummary {
        PaymentSummary {
            payment,
            property_id: Some(Uuid::new_v4()),
            property_address: Some("Długa 5".to_string()),
            tenant_id: Some(Uuid::new_v4()),
            tenant_name: Some("Jan <Kowalski>".to_string()),
        }
    }

    #[test]
    fn test_monthly_page_groups_and_totals() {
        let monthly = MonthlyPayments::build(
            2025,
            3,
            vec![summary(payment("https://inv.example.com/1"))],
        );
        let Html(html) = monthly_page(&Page::default(), &monthly);
        assert!(html.contains("Payments for March 2025"));
        assert!(html.contains("Długa 5 <small>3755.00</small>"));
        assert!(html.contains("Jan &lt;Kowalski&gt;"));
        assert!(html.contains("255.00 (8.50%)"));
        assert!(html.contains(r#"<span class="badge badge-danger">Overdue</span>"#));
        assert!(html.contains(r#"href="https://inv.example.com/1""#));
        assert!(html.contains("/payments?year=2025&amp;month=2"));
        assert!(html.contains("/payments?year=2025&amp;month=4"));
        assert!(html.contains(r#"action="/payments/report""#));
    }

    #[test]
    fn test_empty_month() {
        let monthly = MonthlyPayments::build(2025, 1, Vec::new());
        let Html(html) = monthly_page(&Page::default(), &monthly);
        assert!(html.contains("No payments due this month."));
        assert!(html.contains("/payments?year=2024&amp;month=12"));
    }

    #[test]
    fn test_new_page_requires_agreement() {
        let Html(html) = new_page(
            &Page::default(),
            &[],
            &PaymentForm::default(),
            &FormErrors::new(),
        );
        assert!(html.contains(r#"href="/agreements""#));
        assert!(!html.contains(r#"action="/payments""#));
    }

    #[test]
    fn test_tenant_page_lists_own_payments() {
        let Html(html) = tenant_page(&Page::default(), &[summary(payment(""))]);
        assert!(html.contains("Długa 5"));
        assert!(html.contains("3755.00"));
        assert!(!html.contains("Invoice</a>"));
        assert!(!html.contains("/delete"));

        let Html(empty) = tenant_page(&Page::default(), &[]);
        assert!(empty.contains("No payments yet."));
    }
}
