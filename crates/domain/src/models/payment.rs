//! Monthly payment domain models, the monthly overview and the period report.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::ValidateUrl;

use super::form::FormErrors;
use crate::services::tax::TaxAssessment;
use shared::validation::{parse_date, parse_non_negative, parse_optional_amount, parse_optional_date};

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Name of a 1-based month, empty when out of range.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTH_NAMES.get(i as usize))
        .copied()
        .unwrap_or("")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
    Cancelled,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Overdue,
        PaymentStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Overdue => "overdue",
            PaymentStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Overdue => "Overdue",
            PaymentStatus::Cancelled => "Cancelled",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "badge badge-info",
            PaymentStatus::Paid => "badge badge-success",
            PaymentStatus::Overdue => "badge badge-danger",
            PaymentStatus::Cancelled => "badge",
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "paid" => Ok(PaymentStatus::Paid),
            "overdue" => Ok(PaymentStatus::Overdue),
            "cancelled" => Ok(PaymentStatus::Cancelled),
            _ => Err(format!("Invalid payment status: {}", s)),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One month's payment, with tax computed at save time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Payment {
    pub id: Uuid,
    /// User id of the landlord the payment is owed to.
    pub landlord_id: Uuid,
    /// Cleared when the agreement is deleted.
    pub rental_agreement_id: Option<Uuid>,
    pub date_due: NaiveDate,
    pub date_paid: Option<NaiveDate>,
    pub base_rent: f64,
    pub coop_fee: f64,
    pub electricity: f64,
    pub gas: f64,
    pub other_fees: f64,
    /// Fraction, e.g. 0.085.
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
    pub status: PaymentStatus,
    pub invoice_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn tax_rate_display(&self) -> String {
        format!("{:.2}%", self.tax_rate * 100.0)
    }
}

/// Payment joined with its agreement's property and tenant, when still linked.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentSummary {
    pub payment: Payment,
    pub property_id: Option<Uuid>,
    pub property_address: Option<String>,
    pub tenant_id: Option<Uuid>,
    pub tenant_name: Option<String>,
}

impl PaymentSummary {
    pub fn property_display(&self) -> &str {
        self.property_address.as_deref().unwrap_or("Unassigned")
    }

    pub fn tenant_display(&self) -> &str {
        self.tenant_name.as_deref().unwrap_or("Unassigned")
    }
}

/// Absolute http(s) URL; other schemes are never rendered as links.
fn is_web_url(raw: &str) -> bool {
    let lower = raw.to_ascii_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://")) && raw.validate_url()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub rental_agreement_id: String,
    #[serde(default)]
    pub date_due: String,
    #[serde(default)]
    pub date_paid: String,
    #[serde(default)]
    pub base_rent: String,
    #[serde(default)]
    pub coop_fee: String,
    #[serde(default)]
    pub electricity: String,
    #[serde(default)]
    pub gas: String,
    #[serde(default)]
    pub other_fees: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub invoice_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentInput {
    pub rental_agreement_id: Uuid,
    pub date_due: NaiveDate,
    pub date_paid: Option<NaiveDate>,
    pub base_rent: f64,
    pub coop_fee: f64,
    pub electricity: f64,
    pub gas: f64,
    pub other_fees: f64,
    pub status: PaymentStatus,
    pub invoice_url: String,
}

/// Tax and total derived from an input and its tax assessment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentCharges {
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total_amount: f64,
}

impl PaymentInput {
    /// Every fee before tax.
    pub fn subtotal(&self) -> f64 {
        self.base_rent + self.coop_fee + self.electricity + self.gas + self.other_fees
    }

    pub fn charges(&self, tax: TaxAssessment) -> PaymentCharges {
        PaymentCharges {
            tax_rate: tax.rate,
            tax_amount: tax.amount,
            total_amount: self.subtotal() + tax.amount,
        }
    }
}

impl PaymentForm {
    pub fn from_payment(payment: &Payment) -> Self {
        Self {
            rental_agreement_id: payment
                .rental_agreement_id
                .map(|id| id.to_string())
                .unwrap_or_default(),
            date_due: payment.date_due.format("%Y-%m-%d").to_string(),
            date_paid: payment
                .date_paid
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            base_rent: payment.base_rent.to_string(),
            coop_fee: payment.coop_fee.to_string(),
            electricity: payment.electricity.to_string(),
            gas: payment.gas.to_string(),
            other_fees: payment.other_fees.to_string(),
            status: payment.status.as_str().to_string(),
            invoice_url: payment.invoice_url.clone(),
        }
    }

    /// Cleans the form; the agreement must be one of `allowed_agreements`.
    pub fn clean(&self, allowed_agreements: &[Uuid]) -> Result<PaymentInput, FormErrors> {
        let mut errors = FormErrors::new();

        let rental_agreement_id = Uuid::parse_str(self.rental_agreement_id.trim())
            .ok()
            .filter(|id| allowed_agreements.contains(id));
        if rental_agreement_id.is_none() {
            errors.add("rental_agreement_id", INVALID_CHOICE);
        }

        let date_due = parse_date(&self.date_due)
            .map_err(|message| errors.add("date_due", message))
            .ok();
        let date_paid = parse_optional_date(&self.date_paid).unwrap_or_else(|message| {
            errors.add("date_paid", message);
            None
        });

        let base_rent = parse_non_negative(&self.base_rent).unwrap_or_else(|message| {
            errors.add("base_rent", message);
            0.0
        });
        let mut amount = |field: &str, raw: &str| {
            parse_optional_amount(raw).unwrap_or_else(|message| {
                errors.add(field, message);
                0.0
            })
        };
        let coop_fee = amount("coop_fee", &self.coop_fee);
        let electricity = amount("electricity", &self.electricity);
        let gas = amount("gas", &self.gas);
        let other_fees = amount("other_fees", &self.other_fees);

        let status = if self.status.trim().is_empty() {
            PaymentStatus::default()
        } else {
            PaymentStatus::from_str(self.status.trim()).unwrap_or_else(|_| {
                errors.add("status", INVALID_CHOICE);
                PaymentStatus::default()
            })
        };

        let invoice_url = self.invoice_url.trim().to_string();
        if invoice_url.len() > 200 {
            errors.add("invoice_url", "Ensure this value has at most 200 characters.");
        } else if !invoice_url.is_empty() && !is_web_url(&invoice_url) {
            errors.add("invoice_url", "Enter a valid URL.");
        }

        match (rental_agreement_id, date_due) {
            (Some(rental_agreement_id), Some(date_due)) => errors.into_result(PaymentInput {
                rental_agreement_id,
                date_due,
                date_paid,
                base_rent,
                coop_fee,
                electricity,
                gas,
                other_fees,
                status,
                invoice_url,
            }),
            _ => Err(errors),
        }
    }
}

/// A tenant's payments within one property group of the monthly overview.
#[derive(Debug, Clone)]
pub struct TenantPayments {
    pub tenant_id: Option<Uuid>,
    pub tenant: String,
    pub payments: Vec<PaymentSummary>,
    pub tenant_total: f64,
}

#[derive(Debug, Clone)]
pub struct PropertyPayments {
    pub property_id: Option<Uuid>,
    pub property: String,
    pub tenants: Vec<TenantPayments>,
    pub property_total: f64,
}

/// Payments due in one month, grouped by property then by tenant.
#[derive(Debug, Clone)]
pub struct MonthlyPayments {
    pub year: i32,
    pub month: u32,
    pub properties: Vec<PropertyPayments>,
    /// Sum of base rent.
    pub total_income: f64,
    pub total_tax: f64,
}

impl MonthlyPayments {
    /// Groups in first-seen order; pass payments sorted as they should appear.
    pub fn build(year: i32, month: u32, payments: Vec<PaymentSummary>) -> Self {
        let mut properties: Vec<PropertyPayments> = Vec::new();
        let mut total_income = 0.0;
        let mut total_tax = 0.0;

        for summary in payments {
            total_income += summary.payment.base_rent;
            total_tax += summary.payment.tax_amount;
            let total = summary.payment.total_amount;

            let group_index = match properties
                .iter()
                .position(|g| g.property_id == summary.property_id)
            {
                Some(index) => index,
                None => {
                    properties.push(PropertyPayments {
                        property_id: summary.property_id,
                        property: summary.property_display().to_string(),
                        tenants: Vec::new(),
                        property_total: 0.0,
                    });
                    properties.len() - 1
                }
            };
            let group = &mut properties[group_index];
            group.property_total += total;

            let tenant_index = match group
                .tenants
                .iter()
                .position(|t| t.tenant_id == summary.tenant_id)
            {
                Some(index) => index,
                None => {
                    group.tenants.push(TenantPayments {
                        tenant_id: summary.tenant_id,
                        tenant: summary.tenant_display().to_string(),
                        payments: Vec::new(),
                        tenant_total: 0.0,
                    });
                    group.tenants.len() - 1
                }
            };
            let tenant = &mut group.tenants[tenant_index];
            tenant.tenant_total += total;
            tenant.payments.push(summary);
        }

        Self {
            year,
            month,
            properties,
            total_income,
            total_tax,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    pub fn title(&self) -> String {
        format!("{} {}", month_name(self.month), self.year)
    }

    pub fn previous(&self) -> (i32, u32) {
        if self.month == 1 {
            (self.year - 1, 12)
        } else {
            (self.year, self.month - 1)
        }
    }

    pub fn next(&self) -> (i32, u32) {
        if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        }
    }
}

/// `?year=&month=` as typed; anything unparsable falls back to `today`.
pub fn resolve_month(year: Option<&str>, month: Option<&str>, today: NaiveDate) -> (i32, u32) {
    let year = year
        .and_then(|y| y.trim().parse::<i32>().ok())
        .filter(|y| (1..=9999).contains(y))
        .unwrap_or_else(|| today.year());
    let month = month
        .and_then(|m| m.trim().parse::<u32>().ok())
        .filter(|m| (1..=12).contains(m))
        .unwrap_or_else(|| today.month());
    (year, month)
}

/// First and last day of a month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next_first.pred_opt()?))
}

/// Months covered by a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    pub year: i32,
    pub start_month: u32,
    pub end_month: u32,
}

impl ReportPeriod {
    /// A missing month or a `full_year` flag selects the whole year. Months
    /// are clamped to 1..=12 and swapped when given in reverse.
    pub fn from_query(
        year: Option<&str>,
        full_year: Option<&str>,
        start_month: Option<&str>,
        end_month: Option<&str>,
        today: NaiveDate,
    ) -> Self {
        let year = year
            .and_then(|y| y.trim().parse::<i32>().ok())
            .filter(|y| (1..=9999).contains(y))
            .unwrap_or_else(|| today.year());
        let full_year = full_year
            .map(|f| matches!(f.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
            .unwrap_or(false);
        let month = |raw: Option<&str>| {
            raw.and_then(|m| m.trim().parse::<i64>().ok())
                .filter(|m| *m != 0)
                .map(|m| m.clamp(1, 12) as u32)
        };

        let (start, end) = match (month(start_month), month(end_month)) {
            (Some(start), Some(end)) if !full_year => (start.min(end), start.max(end)),
            _ => (1, 12),
        };
        Self {
            year,
            start_month: start,
            end_month: end,
        }
    }

    pub fn is_full_year(&self) -> bool {
        self.start_month == 1 && self.end_month == 12
    }

    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let (start, _) = month_bounds(self.year, self.start_month)?;
        let (_, end) = month_bounds(self.year, self.end_month)?;
        Some((start, end))
    }

    pub fn label(&self) -> String {
        if self.is_full_year() {
            format!("Year {}", self.year)
        } else {
            format!(
                "{}-{} {}",
                month_name(self.start_month),
                month_name(self.end_month),
                self.year
            )
        }
    }

    pub fn filename(&self) -> String {
        if self.is_full_year() {
            format!("payments_report_{}_full_year.csv", self.year)
        } else {
            format!(
                "payments_report_{}_{:02}_{:02}.csv",
                self.year, self.start_month, self.end_month
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ReportTotals {
    pub count: u64,
    /// Sum of base rent.
    pub income: f64,
    pub tax: f64,
    pub total: f64,
}

impl ReportTotals {
    fn add(&mut self, payment: &Payment) {
        self.count += 1;
        self.income += payment.base_rent;
        self.tax += payment.tax_amount;
        self.total += payment.total_amount;
    }
}

/// Per-month aggregates over a report period.
#[derive(Debug, Clone)]
pub struct PaymentReport {
    pub period: ReportPeriod,
    /// One row per month in the period, empty months included.
    pub months: Vec<(u32, ReportTotals)>,
    pub grand: ReportTotals,
}

impl PaymentReport {
    /// Payments outside the period are ignored.
    pub fn build(period: ReportPeriod, payments: &[Payment]) -> Self {
        let mut months: Vec<(u32, ReportTotals)> = (period.start_month..=period.end_month)
            .map(|m| (m, ReportTotals::default()))
            .collect();
        let mut grand = ReportTotals::default();

        for payment in payments {
            if payment.date_due.year() != period.year {
                continue;
            }
            let month = payment.date_due.month();
            if let Some((_, totals)) = months.iter_mut().find(|(m, _)| *m == month) {
                totals.add(payment);
                grand.add(payment);
            }
        }

        Self {
            period,
            months,
            grand,
        }
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("month,payments,income,tax,total\n");

        for (month, totals) in &self.months {
            csv.push_str(&format!(
                "{},{},{:.2},{:.2},{:.2}\n",
                month_name(*month),
                totals.count,
                totals.income,
                totals.tax,
                totals.total
            ));
        }
        csv.push_str(&format!(
            "Totals,{},{:.2},{:.2},{:.2}\n",
            self.grand.count, self.grand.income, self.grand.tax, self.grand.total
        ));

        csv
    }
}
