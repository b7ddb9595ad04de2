//! User, profile and session domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::form::FormErrors;

/// Contact line stored on freshly created profiles.
pub const DEFAULT_CONTACT_INFO: &str = "Please update your contact information";

/// Default tax residency for landlord profiles.
pub const DEFAULT_TAX_RESIDENCY_COUNTRY: &str = "PL";

/// Role of a user account; drives which pages and rows are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Tenant,
    Landlord,
    Administrator,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Tenant => "tenant",
            UserRole::Landlord => "landlord",
            UserRole::Administrator => "administrator",
        }
    }

    /// Human-readable role name shown on the profile page.
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Tenant => "Tenant",
            UserRole::Landlord => "Landlord",
            UserRole::Administrator => "Administrator",
        }
    }
}

impl FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tenant" => Ok(UserRole::Tenant),
            "landlord" => Ok(UserRole::Landlord),
            "administrator" => Ok(UserRole::Administrator),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Represents a user account in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn is_landlord(&self) -> bool {
        self.role == UserRole::Landlord
    }
}

/// Landlord-specific profile data, one per landlord account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LandlordProfile {
    pub user_id: Uuid,
    pub name: String,
    pub contact_info: String,
    pub tax_residency_country: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Tenant-specific profile data, one per tenant account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TenantProfile {
    pub user_id: Uuid,
    pub name: String,
    pub contact_info: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A tenant or landlord together with their account email, for contact lists.
#[derive(Debug, Clone, Serialize)]
pub struct Contact {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub contact_info: String,
}

/// A browser session backed by a hashed cookie token.
#[derive(Debug, Clone)]
pub struct UserSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub last_used_at: DateTime<Utc>,
}

/// Name given to a profile created automatically for `email`.
pub fn default_profile_name(role: UserRole, email: &str) -> String {
    format!("{} {}", role.label(), email)
}

/// Normalizes an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Registration form as submitted.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(email(message = "Enter a valid email address."))]
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub password_confirm: String,

    /// Checkbox; present only when ticked.
    #[serde(default)]
    pub is_landlord: Option<String>,
}

/// A validated registration.
#[derive(Debug, Clone, PartialEq)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

impl RegisterForm {
    pub fn wants_landlord(&self) -> bool {
        matches!(self.is_landlord.as_deref(), Some(v) if !v.is_empty() && v != "false")
    }

    pub fn clean(&self) -> Result<Registration, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };
        let email = normalize_email(&self.email);

        errors.merge(clean_new_password(
            &self.password,
            &self.password_confirm,
            &email,
        ));

        errors.into_result(Registration {
            email,
            password: self.password.clone(),
            role: if self.wants_landlord() {
                UserRole::Landlord
            } else {
                UserRole::Tenant
            },
        })
    }
}

/// Checks a new password and its confirmation, collecting errors under
/// `password` and `password_confirm`.
pub fn clean_new_password(password: &str, confirm: &str, email: &str) -> FormErrors {
    let mut errors = FormErrors::new();
    if password.is_empty() {
        errors.add("password", "This field is required.");
    } else if let Err(problems) = shared::password::check_password_policy(password, email) {
        for problem in problems {
            errors.add("password", problem);
        }
    }
    if password != confirm {
        errors.add("password_confirm", "The two password fields didn't match.");
    }
    errors
}

/// Login form as submitted.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[serde(default)]
    pub email: String,

    #[validate(custom(function = "shared::validation::validate_not_blank"))]
    #[serde(default)]
    pub password: String,

    /// Path to return to after login.
    #[serde(default)]
    pub next: Option<String>,
}

impl LoginForm {
    pub fn clean(&self) -> Result<(String, String), FormErrors> {
        self.validate().map_err(FormErrors::from)?;
        Ok((normalize_email(&self.email), self.password.clone()))
    }
}

/// Profile edit form for tenants and landlords.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 255, message = "Ensure this value has at most 255 characters.")
    )]
    #[serde(default)]
    pub name: String,

    #[validate(length(max = 2000, message = "Ensure this value has at most 2000 characters."))]
    #[serde(default)]
    pub contact_info: String,

    /// Landlords only.
    #[serde(default)]
    pub tax_residency_country: Option<String>,
}

/// A validated profile update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub name: String,
    pub contact_info: String,
    pub tax_residency_country: Option<String>,
}

impl ProfileForm {
    pub fn from_landlord(profile: &LandlordProfile) -> Self {
        Self {
            name: profile.name.clone(),
            contact_info: profile.contact_info.clone(),
            tax_residency_country: Some(profile.tax_residency_country.clone()),
        }
    }

    pub fn from_tenant(profile: &TenantProfile) -> Self {
        Self {
            name: profile.name.clone(),
            contact_info: profile.contact_info.clone(),
            tax_residency_country: None,
        }
    }

    pub fn clean(&self) -> Result<ProfileUpdate, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let country = self
            .tax_residency_country
            .as_deref()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty());
        if let Some(code) = &country {
            if let Err(e) = shared::validation::validate_country_code(code) {
                errors.add(
                    "tax_residency_country",
                    e.message.map(|m| m.to_string()).unwrap_or_default(),
                );
            }
        }

        errors.into_result(ProfileUpdate {
            name: self.name.trim().to_string(),
            contact_info: self.contact_info.trim().to_string(),
            tax_residency_country: country,
        })
    }
}
