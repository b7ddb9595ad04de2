//! Flat-rate rental income tax for landlords resident in Poland.
//!
//! Base rent is taxed per landlord per calendar year: 8.5% up to
//! 100 000 PLN of year-to-date base rent, 12.5% on everything above. A
//! payment that crosses the threshold is split between the two bands.
//! Landlords resident elsewhere pay nothing through this system.

pub const LOW_RATE: f64 = 0.085;
pub const HIGH_RATE: f64 = 0.125;
pub const THRESHOLD_PLN: f64 = 100_000.0;
pub const POLAND_CODE: &str = "PL";

/// Tax owed on one payment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TaxAssessment {
    /// Effective rate as a fraction, e.g. 0.085.
    pub rate: f64,
    pub amount: f64,
}

impl TaxAssessment {
    /// Rate as a percentage with two decimals, e.g. "8.50%".
    pub fn rate_display(&self) -> String {
        format!("{:.2}%", self.rate * 100.0)
    }
}

pub fn is_polish_resident(tax_residency_country: &str) -> bool {
    tax_residency_country.trim().eq_ignore_ascii_case(POLAND_CODE)
}

/// Tax on `base_rent`, given the landlord's base rent already due earlier
/// in the same calendar year.
pub fn assess(base_rent: f64, ytd_base_rent_before: f64, tax_residency_country: &str) -> TaxAssessment {
    if !is_polish_resident(tax_residency_country) || base_rent <= 0.0 {
        return TaxAssessment::default();
    }

    let remaining_low_band = (THRESHOLD_PLN - ytd_base_rent_before).max(0.0);
    let taxed_at_low = base_rent.min(remaining_low_band);
    let taxed_at_high = (base_rent - taxed_at_low).max(0.0);

    let amount = taxed_at_low * LOW_RATE + taxed_at_high * HIGH_RATE;
    TaxAssessment {
        rate: amount / base_rent,
        amount,
    }
}
