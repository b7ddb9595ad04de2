//! Common validation utilities for form fields.
//!
//! HTML forms submit everything as text, so numeric and date fields are
//! parsed here with user-facing error messages.

use chrono::{DateTime, NaiveDate, Utc};
use validator::ValidationError;

/// Validates that a text field contains something other than whitespace.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("This field is required.".into());
        Err(err)
    } else {
        Ok(())
    }
}

/// Validates a postal code: digits, letters, spaces and dashes, at least
/// one digit.
pub fn validate_postal_code(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    let allowed = trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == ' ' || c == '-');
    if !trimmed.is_empty() && allowed && trimmed.chars().any(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("postal_code");
        err.message = Some("Enter a valid postal code.".into());
        Err(err)
    }
}

/// Validates an ISO 3166-1 alpha-2 country code (two ASCII letters).
pub fn validate_country_code(value: &str) -> Result<(), ValidationError> {
    if value.len() == 2 && value.chars().all(|c| c.is_ascii_uppercase()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("country_code");
        err.message = Some("Enter a two-letter country code, e.g. PL.".into());
        Err(err)
    }
}

/// Parses a non-negative decimal number typed into a form.
///
/// Accepts a comma as decimal separator.
pub fn parse_non_negative(raw: &str) -> Result<f64, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("This field is required.".to_string());
    }
    let value: f64 = trimmed
        .replace(',', ".")
        .parse()
        .map_err(|_| "Enter a number.".to_string())?;
    if !value.is_finite() {
        return Err("Enter a number.".to_string());
    }
    if value < 0.0 {
        return Err("Ensure this value is greater than or equal to 0.".to_string());
    }
    Ok(value)
}

/// Like [`parse_non_negative`], but an empty field means 0.
pub fn parse_optional_amount(raw: &str) -> Result<f64, String> {
    if raw.trim().is_empty() {
        Ok(0.0)
    } else {
        parse_non_negative(raw)
    }
}

/// Parses a required `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("This field is required.".to_string());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| "Enter a valid date (YYYY-MM-DD).".to_string())
}

/// Parses an optional `YYYY-MM-DD` date; blank means none.
pub fn parse_optional_date(raw: &str) -> Result<Option<NaiveDate>, String> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(raw).map(Some)
    }
}

/// Parses a `YYYY-MM-DD` date into midnight UTC of that day.
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>, String> {
    let date = parse_date(raw)?;
    date.and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
        .ok_or_else(|| "Enter a valid date (YYYY-MM-DD).".to_string())
}
