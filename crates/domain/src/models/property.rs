//! Property domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::form::FormErrors;
use shared::validation::parse_non_negative;

/// Occupancy status of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    Available,
    Rented,
    UnderMaintenance,
    Unavailable,
}

impl PropertyStatus {
    pub const ALL: [PropertyStatus; 4] = [
        PropertyStatus::Available,
        PropertyStatus::Rented,
        PropertyStatus::UnderMaintenance,
        PropertyStatus::Unavailable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "available",
            PropertyStatus::Rented => "rented",
            PropertyStatus::UnderMaintenance => "under_maintenance",
            PropertyStatus::Unavailable => "unavailable",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PropertyStatus::Available => "Available",
            PropertyStatus::Rented => "Rented",
            PropertyStatus::UnderMaintenance => "Under maintenance",
            PropertyStatus::Unavailable => "Unavailable",
        }
    }
}

impl FromStr for PropertyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(PropertyStatus::Available),
            "rented" => Ok(PropertyStatus::Rented),
            "under_maintenance" => Ok(PropertyStatus::UnderMaintenance),
            "unavailable" => Ok(PropertyStatus::Unavailable),
            _ => Err(format!("Invalid property status: {}", s)),
        }
    }
}

impl fmt::Display for PropertyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A rentable unit owned by a landlord.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Property {
    pub id: Uuid,
    /// User id of the owning landlord profile.
    pub landlord_id: Uuid,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub area_m2: f64,
    pub current_rent: f64,
    pub additional_costs: f64,
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Property {
    /// Rent plus additional costs.
    pub fn total_monthly_cost(&self) -> f64 {
        self.current_rent + self.additional_costs
    }

    /// One-line address for lists and select boxes.
    pub fn display_address(&self) -> String {
        format!("{}, {} {}", self.address, self.postal_code, self.city)
    }
}

/// Property add/edit form as submitted. Numbers arrive as text.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PropertyForm {
    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    #[serde(default)]
    pub address: String,

    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 100, message = "Ensure this value has at most 100 characters.")
    )]
    #[serde(default)]
    pub city: String,

    #[validate(
        custom(function = "shared::validation::validate_postal_code"),
        length(max = 20, message = "Ensure this value has at most 20 characters.")
    )]
    #[serde(default)]
    pub postal_code: String,

    #[serde(default)]
    pub area_m2: String,

    #[serde(default)]
    pub current_rent: String,

    #[serde(default)]
    pub additional_costs: String,

    #[serde(default)]
    pub status: String,
}

/// Validated property fields, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyInput {
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub area_m2: f64,
    pub current_rent: f64,
    pub additional_costs: f64,
    pub status: PropertyStatus,
}

impl PropertyForm {
    /// Prefills the edit form from a stored property.
    pub fn from_property(property: &Property) -> Self {
        Self {
            address: property.address.clone(),
            city: property.city.clone(),
            postal_code: property.postal_code.clone(),
            area_m2: property.area_m2.to_string(),
            current_rent: property.current_rent.to_string(),
            additional_costs: property.additional_costs.to_string(),
            status: property.status.as_str().to_string(),
        }
    }

    pub fn clean(&self) -> Result<PropertyInput, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let mut number = |field: &str, raw: &str| match parse_non_negative(raw) {
            Ok(value) => value,
            Err(message) => {
                errors.add(field, message);
                0.0
            }
        };
        let area_m2 = number("area_m2", &self.area_m2);
        let current_rent = number("current_rent", &self.current_rent);
        let additional_costs = number("additional_costs", &self.additional_costs);

        let status = if self.status.trim().is_empty() {
            PropertyStatus::default()
        } else {
            match PropertyStatus::from_str(self.status.trim()) {
                Ok(status) => status,
                Err(_) => {
                    errors.add(
                        "status",
                        "Select a valid choice. That choice is not one of the available choices.",
                    );
                    PropertyStatus::default()
                }
            }
        };

        errors.into_result(PropertyInput {
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            area_m2,
            current_rent,
            additional_costs,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> PropertyForm {
        PropertyForm {
            address: "ul. Marszałkowska 10/4".to_string(),
            city: "Warszawa".to_string(),
            postal_code: "00-590".to_string(),
            area_m2: "54.5".to_string(),
            current_rent: "3200".to_string(),
            additional_costs: "450.00".to_string(),
            status: "rented".to_string(),
        }
    }

    #[test]
    fn test_status_round_trip_and_labels() {
        for status in PropertyStatus::ALL {
            assert_eq!(PropertyStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert_eq!(PropertyStatus::UnderMaintenance.label(), "Under maintenance");
        assert_eq!(PropertyStatus::default(), PropertyStatus::Available);
        assert!(PropertyStatus::from_str("sold").is_err());
    }

    #[test]
    fn test_clean_valid_form() {
        let input = valid_form().clean().unwrap();
        assert_eq!(input.city, "Warszawa");
        assert_eq!(input.area_m2, 54.5);
        assert_eq!(input.current_rent, 3200.0);
        assert_eq!(input.additional_costs, 450.0);
        assert_eq!(input.status, PropertyStatus::Rented);
    }

    #[test]
    fn test_clean_defaults_status_to_available() {
        let mut form = valid_form();
        form.status = String::new();
        assert_eq!(form.clean().unwrap().status, PropertyStatus::Available);
    }

    #[test]
    fn test_clean_rejects_negative_and_non_numeric() {
        let mut form = valid_form();
        form.current_rent = "-100".to_string();
        form.area_m2 = "big".to_string();
        let errors = form.clean().unwrap_err();
        assert!(errors.has("current_rent"));
        assert!(errors.has("area_m2"));
        assert!(!errors.has("additional_costs"));
    }

    #[test]
    fn test_clean_rejects_missing_and_long_fields() {
        let mut form = valid_form();
        form.address = String::new();
        form.city = "x".repeat(101);
        form.status = "sold".to_string();
        let errors = form.clean().unwrap_err();
        assert!(errors.has("address"));
        assert!(errors.has("city"));
        assert!(errors.has("status"));
    }

    #[test]
    fn test_from_property_prefills_form() {
        let now = Utc::now();
        let property = Property {
            id: Uuid::new_v4(),
            landlord_id: Uuid::new_v4(),
            address: "Długa 1".to_string(),
            city: "Gdańsk".to_string(),
            postal_code: "80-831".to_string(),
            area_m2: 40.0,
            current_rent: 2500.0,
            additional_costs: 300.5,
            status: PropertyStatus::UnderMaintenance,
            created_at: now,
            updated_at: now,
        };
        let form = PropertyForm::from_property(&property);
        assert_eq!(form.status, "under_maintenance");
        assert_eq!(form.additional_costs, "300.5");
        assert_eq!(property.total_monthly_cost(), 2800.5);
        assert_eq!(property.display_address(), "Długa 1, 80-831 Gdańsk");
    }
}
