use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use chrono::{Datelike, NaiveDate, Utc};
use domain::models::payment::{
    month_bounds, resolve_month, PaymentForm, PaymentInput, ReportPeriod,
};
use domain::models::{
    AgreementSummary, FormErrors, MonthlyPayments, Payment, PaymentReport, PaymentSummary,
};
use domain::services::authorization::{can_view_own_payments, tenancy_access, Access};
use domain::services::tax::{self, TaxAssessment};
use persistence::repositories::PaymentRepository;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::AppError;
use crate::extractors::{CsrfForm, CurrentUser, LandlordUser, NoFields};
use crate::middleware::metrics::record_payment_saved;
use crate::routes::agreements::landlord_agreements;
use crate::services::flash::{redirect, FlashMessage};
use crate::views::payments::{edit_page, monthly_page, new_page, tenant_page};
use crate::views::Page;

#[derive(Debug, Default, Deserialize)]
pub struct MonthQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewPaymentQuery {
    /// Agreement whose fees prefill the form.
    pub agreement: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    pub year: Option<String>,
    pub full_year: Option<String>,
    pub start_month: Option<String>,
    pub end_month: Option<String>,
}

fn monthly_url(date_due: NaiveDate) -> String {
    format!(
        "/payments?year={}&month={}",
        date_due.year(),
        date_due.month()
    )
}

fn agreement_ids(agreements: &[AgreementSummary]) -> Vec<Uuid> {
    agreements.iter().map(|a| a.agreement.id).collect()
}

/// Loads a payment owed to `landlord`.
async fn owned_payment(
    state: &AppState,
    landlord: &LandlordUser,
    id: Uuid,
) -> Result<Payment, AppError> {
    let payment: Payment = PaymentRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(AppError::not_found)?
        .into();

    match tenancy_access(landlord.current.actor(), payment.landlord_id) {
        Access::Allowed => Ok(payment),
        Access::Forbidden => Err(AppError::forbidden()),
        Access::NotFound => Err(AppError::not_found()),
    }
}

/// Tax on `input` given the landlord's earlier payments this year.
async fn assess_tax(
    state: &AppState,
    landlord: &LandlordUser,
    input: &PaymentInput,
    exclude: Option<Uuid>,
) -> Result<TaxAssessment, AppError> {
    if !tax::is_polish_resident(&landlord.profile.tax_residency_country) {
        return Ok(TaxAssessment::default());
    }
    let year_start = NaiveDate::from_ymd_opt(input.date_due.year(), 1, 1)
        .ok_or_else(|| AppError::BadRequest("Invalid due date.".into()))?;
    let ytd = PaymentRepository::new(state.pool.clone())
        .ytd_base_rent_before(landlord.id(), year_start, input.date_due, exclude)
        .await?;
    Ok(tax::assess(
        input.base_rent,
        ytd,
        &landlord.profile.tax_residency_country,
    ))
}

pub async fn monthly_payments(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
    Query(query): Query<MonthQuery>,
) -> Result<Html<String>, AppError> {
    let today = Utc::now().date_naive();
    let (year, month) = resolve_month(query.year.as_deref(), query.month.as_deref(), today);
    let (first, last) =
        month_bounds(year, month).ok_or_else(|| AppError::BadRequest("Invalid month.".into()))?;

    let payments: Vec<PaymentSummary> = PaymentRepository::new(state.pool.clone())
        .list_by_landlord_between(landlord.id(), first, last)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    let monthly = MonthlyPayments::build(year, month, payments);
    Ok(monthly_page(&page, &monthly))
}

pub async fn new_payment(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
    Query(query): Query<NewPaymentQuery>,
) -> Result<Html<String>, AppError> {
    let agreements = landlord_agreements(&state, landlord.id()).await?;
    let mut form = PaymentForm {
        date_due: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
        ..PaymentForm::default()
    };

    let selected = query
        .agreement
        .as_deref()
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .and_then(|id| agreements.iter().find(|a| a.agreement.id == id));
    if let Some(summary) = selected {
        let a = &summary.agreement;
        form.rental_agreement_id = a.id.to_string();
        form.base_rent = a.base_rent.to_string();
        form.coop_fee = a.coop_fee.to_string();
        form.electricity = a.electricity.to_string();
        form.gas = a.gas.to_string();
        form.other_fees = a.other_fees.to_string();
    }

    Ok(new_page(&page, &agreements, &form, &FormErrors::new()))
}

pub async fn create_payment(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
    CsrfForm(form): CsrfForm<PaymentForm>,
) -> Result<Response, AppError> {
    let agreements = landlord_agreements(&state, landlord.id()).await?;

    let input = match form.clean(&agreement_ids(&agreements)) {
        Ok(input) => input,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                new_page(&page, &agreements, &form, &errors),
            )
                .into_response())
        }
    };

    let tax = assess_tax(&state, &landlord, &input, None).await?;
    let charges = input.charges(tax);
    let payment = PaymentRepository::new(state.pool.clone())
        .create(landlord.id(), &input, &charges)
        .await?;
    record_payment_saved(true);
    info!(
        payment_id = %payment.id,
        agreement_id = %input.rental_agreement_id,
        tax_amount = charges.tax_amount,
        "Payment created"
    );

    Ok(redirect(
        &state.cookies,
        &monthly_url(input.date_due),
        FlashMessage::success("Payment created successfully."),
    ))
}

pub async fn edit_payment(
    State(state): State<AppState>,
    landlord: LandlordUser,
    page: Page,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, AppError> {
    let payment = owned_payment(&state, &landlord, id).await?;
    let agreements = landlord_agreements(&state, landlord.id()).await?;
    let form = PaymentForm::from_payment(&payment);
    Ok(edit_page(&page, &payment, &agreements, &form, &FormErrors::new()))
}

pub async fn update_payment(
    State(state): State<AppState>,
    landlord: LandlordUser,
    Path(id): Path<Uuid>,
    page: Page,
    CsrfForm(form): CsrfForm<PaymentForm>,
) -> Result<Response, AppError> {
    let payment = owned_payment(&state, &landlord, id).await?;
    let agreements = landlord_agreements(&state, landlord.id()).await?;

    let input = match form.clean(&agreement_ids(&agreements)) {
        Ok(input) => input,
        Err(errors) => {
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                edit_page(&page, &payment, &agreements, &form, &errors),
            )
                .into_response())
        }
    };

    let tax = assess_tax(&state, &landlord, &input, Some(id)).await?;
    let charges = input.charges(tax);
    PaymentRepository::new(state.pool.clone())
        .update(id, &input, &charges)
        .await?
        .ok_or_else(AppError::not_found)?;
    record_payment_saved(false);
    info!(payment_id = %id, tax_amount = charges.tax_amount, "Payment updated");

    Ok(redirect(
        &state.cookies,
        &monthly_url(input.date_due),
        FlashMessage::success("Payment updated successfully."),
    ))
}

pub async fn delete_payment(
    State(state): State<AppState>,
    landlord: LandlordUser,
    Path(id): Path<Uuid>,
    CsrfForm(_): CsrfForm<NoFields>,
) -> Result<Response, AppError> {
    let payment = owned_payment(&state, &landlord, id).await?;
    if !PaymentRepository::new(state.pool.clone()).delete(id).await? {
        return Err(AppError::not_found());
    }
    info!(payment_id = %id, "Payment deleted");

    Ok(redirect(
        &state.cookies,
        &monthly_url(payment.date_due),
        FlashMessage::success("Payment deleted successfully."),
    ))
}

/// Per-month totals for a year or a month range, as a CSV download.
pub async fn payments_report(
    State(state): State<AppState>,
    landlord: LandlordUser,
    Query(query): Query<ReportQuery>,
) -> Result<Response, AppError> {
    let period = ReportPeriod::from_query(
        query.year.as_deref(),
        query.full_year.as_deref(),
        query.start_month.as_deref(),
        query.end_month.as_deref(),
        Utc::now().date_naive(),
    );
    let (from, to) = period
        .date_range()
        .ok_or_else(|| AppError::BadRequest("Invalid report period.".into()))?;

    let payments: Vec<Payment> = PaymentRepository::new(state.pool.clone())
        .list_by_landlord_between(landlord.id(), from, to)
        .await?
        .into_iter()
        .map(|row| row.payment.into())
        .collect();

    let report = PaymentReport::build(period, &payments);
    info!(
        landlord_id = %landlord.id(),
        period = %period.label(),
        payments = report.grand.count,
        "Payments report generated"
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", period.filename()),
            ),
        ],
        report.to_csv(),
    )
        .into_response())
}

/// A tenant's own payments, latest due first.
pub async fn my_payments(
    State(state): State<AppState>,
    current: CurrentUser,
    page: Page,
) -> Result<Html<String>, AppError> {
    if !can_view_own_payments(current.role()) {
        return Err(AppError::Forbidden(
            "Only tenants can access this page.".into(),
        ));
    }
    let payments: Vec<PaymentSummary> = PaymentRepository::new(state.pool.clone())
        .list_for_tenant(current.user.id)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(tenant_page(&page, &payments))
}
