//! Rental agreement domain models.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::form::FormErrors;
use shared::validation::{parse_non_negative, parse_optional_amount, parse_optional_date};

const INVALID_CHOICE: &str = "Select a valid choice. That choice is not one of the available choices.";

/// Monthly amounts agreed between a landlord and a tenant for one property.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RentalAgreement {
    pub id: Uuid,
    pub property_id: Uuid,
    /// User id of the tenant.
    pub tenant_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub base_rent: f64,
    pub coop_fee: f64,
    pub electricity: f64,
    pub gas: f64,
    pub other_fees: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RentalAgreement {
    /// Sum of every agreed monthly amount, before tax.
    pub fn monthly_total(&self) -> f64 {
        self.base_rent + self.coop_fee + self.electricity + self.gas + self.other_fees
    }

    /// "open-ended" when neither date is set.
    pub fn period_display(&self) -> String {
        let fmt = |d: Option<NaiveDate>| d.map(|d| d.format("%Y-%m-%d").to_string());
        match (fmt(self.start_date), fmt(self.end_date)) {
            (None, None) => "open-ended".to_string(),
            (Some(start), None) => format!("from {}", start),
            (None, Some(end)) => format!("until {}", end),
            (Some(start), Some(end)) => format!("{} to {}", start, end),
        }
    }
}

/// Agreement joined with the names shown in lists and select boxes.
#[derive(Debug, Clone, Serialize)]
pub struct AgreementSummary {
    pub agreement: RentalAgreement,
    pub landlord_id: Uuid,
    pub property_address: String,
    pub tenant_name: String,
    pub tenant_email: String,
}

impl AgreementSummary {
    pub fn tenant_display(&self) -> &str {
        if self.tenant_name.trim().is_empty() {
            &self.tenant_email
        } else {
            &self.tenant_name
        }
    }

    /// Label used in the payment form's agreement select.
    pub fn choice_label(&self) -> String {
        format!("{} - {}", self.property_address, self.tenant_display())
    }
}

/// Fee details served to the payment form for autofill.
#[derive(Debug, Clone, Serialize)]
pub struct AgreementDetails {
    pub id: Uuid,
    pub tenant: String,
    pub property: String,
    pub base_rent: f64,
    pub coop_fee: f64,
    pub electricity: f64,
    pub gas: f64,
    pub other_fees: f64,
}

impl From<&AgreementSummary> for AgreementDetails {
    fn from(summary: &AgreementSummary) -> Self {
        let a = &summary.agreement;
        Self {
            id: a.id,
            tenant: summary.tenant_display().to_string(),
            property: summary.property_address.clone(),
            base_rent: a.base_rent,
            coop_fee: a.coop_fee,
            electricity: a.electricity,
            gas: a.gas,
            other_fees: a.other_fees,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RentalAgreementForm {
    #[serde(default)]
    pub property_id: String,
    #[serde(default)]
    pub tenant_id: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
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
}

#[derive(Debug, Clone, PartialEq)]
pub struct RentalAgreementInput {
    pub property_id: Uuid,
    pub tenant_id: Uuid,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub base_rent: f64,
    pub coop_fee: f64,
    pub electricity: f64,
    pub gas: f64,
    pub other_fees: f64,
}

fn choice(raw: &str, allowed: &[Uuid]) -> Option<Uuid> {
    Uuid::parse_str(raw.trim())
        .ok()
        .filter(|id| allowed.contains(id))
}

impl RentalAgreementForm {
    pub fn from_agreement(agreement: &RentalAgreement) -> Self {
        let date = |d: Option<NaiveDate>| {
            d.map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default()
        };
        Self {
            property_id: agreement.property_id.to_string(),
            tenant_id: agreement.tenant_id.to_string(),
            start_date: date(agreement.start_date),
            end_date: date(agreement.end_date),
            base_rent: agreement.base_rent.to_string(),
            coop_fee: agreement.coop_fee.to_string(),
            electricity: agreement.electricity.to_string(),
            gas: agreement.gas.to_string(),
            other_fees: agreement.other_fees.to_string(),
        }
    }

    /// Cleans the form against the landlord's own properties and tenants.
    pub fn clean(
        &self,
        allowed_properties: &[Uuid],
        allowed_tenants: &[Uuid],
    ) -> Result<RentalAgreementInput, FormErrors> {
        let mut errors = FormErrors::new();

        let property_id = choice(&self.property_id, allowed_properties);
        if property_id.is_none() {
            errors.add("property_id", INVALID_CHOICE);
        }
        let tenant_id = choice(&self.tenant_id, allowed_tenants);
        if tenant_id.is_none() {
            errors.add("tenant_id", INVALID_CHOICE);
        }

        let mut date = |field: &str, raw: &str| {
            parse_optional_date(raw).unwrap_or_else(|message| {
                errors.add(field, message);
                None
            })
        };
        let start_date = date("start_date", &self.start_date);
        let end_date = date("end_date", &self.end_date);
        if let (Some(start), Some(end)) = (start_date, end_date) {
            if end < start {
                errors.add("end_date", "End date cannot be before the start date.");
            }
        }

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

        match (property_id, tenant_id) {
            (Some(property_id), Some(tenant_id)) => errors.into_result(RentalAgreementInput {
                property_id,
                tenant_id,
                start_date,
                end_date,
                base_rent,
                coop_fee,
                electricity,
                gas,
                other_fees,
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form(property_id: Uuid, tenant_id: Uuid) -> RentalAgreementForm {
        RentalAgreementForm {
            property_id: property_id.to_string(),
            tenant_id: tenant_id.to_string(),
            start_date: "2025-01-01".to_string(),
            end_date: "2025-12-31".to_string(),
            base_rent: "3200".to_string(),
            coop_fee: "450,50".to_string(),
            electricity: String::new(),
            gas: "80".to_string(),
            other_fees: String::new(),
        }
    }

    #[test]
    fn test_clean_valid_form_defaults_blank_fees() {
        let (p, t) = (Uuid::new_v4(), Uuid::new_v4());
        let input = valid_form(p, t).clean(&[p], &[t]).unwrap();
        assert_eq!(input.property_id, p);
        assert_eq!(input.tenant_id, t);
        assert_eq!(input.base_rent, 3200.0);
        assert_eq!(input.coop_fee, 450.5);
        assert_eq!(input.electricity, 0.0);
        assert_eq!(input.start_date, NaiveDate::from_ymd_opt(2025, 1, 1));
    }

    #[test]
    fn test_clean_allows_open_ended_dates() {
        let (p, t) = (Uuid::new_v4(), Uuid::new_v4());
        let mut form = valid_form(p, t);
        form.start_date = String::new();
        form.end_date = String::new();
        let input = form.clean(&[p], &[t]).unwrap();
        assert_eq!(input.start_date, None);
        assert_eq!(input.end_date, None);
    }

    #[test]
    fn test_clean_rejects_foreign_choices_and_bad_fields() {
        let (p, t) = (Uuid::new_v4(), Uuid::new_v4());
        let mut form = valid_form(p, t);
        form.base_rent = String::new();
        form.gas = "-5".to_string();
        form.start_date = "01.01.2025".to_string();
        let errors = form.clean(&[], &[]).unwrap_err();
        for field in ["property_id", "tenant_id", "base_rent", "gas", "start_date"] {
            assert!(errors.has(field), "{} should have an error", field);
        }
    }

    #[test]
    fn test_clean_rejects_end_before_start() {
        let (p, t) = (Uuid::new_v4(), Uuid::new_v4());
        let mut form = valid_form(p, t);
        form.end_date = "2024-12-31".to_string();
        let errors = form.clean(&[p], &[t]).unwrap_err();
        assert!(errors.has("end_date"));
    }

    #[test]
    fn test_monthly_total_and_period() {
        let now = Utc::now();
        let agreement = RentalAgreement {
            id: Uuid::new_v4(),
            property_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            start_date: NaiveDate::from_ymd_opt(2025, 3, 1),
            end_date: None,
            base_rent: 3000.0,
            coop_fee: 400.0,
            electricity: 100.0,
            gas: 50.0,
            other_fees: 25.0,
            created_at: now,
            updated_at: now,
        };
        assert_eq!(agreement.monthly_total(), 3575.0);
        assert_eq!(agreement.period_display(), "from 2025-03-01");

        let form = RentalAgreementForm::from_agreement(&agreement);
        assert_eq!(form.start_date, "2025-03-01");
        assert_eq!(form.end_date, "");
    }
}
