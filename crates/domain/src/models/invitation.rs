//! Tenant invitation domain models.
//!
//! An invitation asks a prospective tenant, identified by email, to take up
//! a property. Status transitions:
//!
//! - Pending -> Accepted (tenant completes signup)
//! - Pending -> Rejected (tenant declines)
//! - Pending -> Expired (expiry date passed)
//! - Pending/Expired -> Pending (landlord resends, same row)
//! - any -> deleted (landlord cancels)

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

use super::form::FormErrors;
use super::user::{clean_new_password, normalize_email};

/// Days an invitation stays valid unless configured otherwise.
pub const DEFAULT_INVITATION_EXPIRY_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
}

impl InvitationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Rejected => "rejected",
            InvitationStatus::Expired => "expired",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            InvitationStatus::Pending => "Pending",
            InvitationStatus::Accepted => "Accepted",
            InvitationStatus::Rejected => "Rejected",
            InvitationStatus::Expired => "Expired",
        }
    }
}

impl FromStr for InvitationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(InvitationStatus::Pending),
            "accepted" => Ok(InvitationStatus::Accepted),
            "rejected" => Ok(InvitationStatus::Rejected),
            "expired" => Ok(InvitationStatus::Expired),
            _ => Err(format!("Invalid invitation status: {}", s)),
        }
    }
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Invitation {
    pub id: Uuid,
    pub email: String,
    pub property_id: Uuid,
    /// User id of the inviting landlord.
    pub landlord_id: Uuid,
    pub token: Uuid,
    pub status: InvitationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Invitation {
    /// True when still pending but past its expiry date.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && self.expires_at < now
    }

    /// Status as it should be shown, treating overdue invitations as expired.
    pub fn effective_status(&self, now: DateTime<Utc>) -> InvitationStatus {
        if self.is_overdue(now) {
            InvitationStatus::Expired
        } else {
            self.status
        }
    }

    /// Only pending or expired invitations may be sent again.
    pub fn can_resend(&self) -> bool {
        matches!(
            self.status,
            InvitationStatus::Pending | InvitationStatus::Expired
        )
    }

    /// Accepting or declining needs a pending, unexpired invitation.
    pub fn is_actionable(&self, now: DateTime<Utc>) -> bool {
        self.effective_status(now) == InvitationStatus::Pending
    }
}

/// Expiry instant for an invitation issued at `issued_at`.
pub fn invitation_expiry(issued_at: DateTime<Utc>, expiry_days: i64) -> DateTime<Utc> {
    issued_at + Duration::days(expiry_days)
}

/// Invitation row joined with its property address, for list pages.
#[derive(Debug, Clone, Serialize)]
pub struct InvitationSummary {
    pub invitation: Invitation,
    pub property_address: String,
}

/// Reasons a new invitation is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateInvitation {
    AlreadyAccepted,
    AlreadyPending,
}

impl DuplicateInvitation {
    pub fn message(&self) -> &'static str {
        match self {
            DuplicateInvitation::AlreadyAccepted => {
                "This tenant has already accepted an invitation for this property."
            }
            DuplicateInvitation::AlreadyPending => {
                "A pending invitation for this email and property already exists."
            }
        }
    }
}

/// Decides whether a new invitation may be sent given the statuses of the
/// existing invitations for the same email and property.
pub fn check_duplicate(existing: &[InvitationStatus]) -> Result<(), DuplicateInvitation> {
    if existing.contains(&InvitationStatus::Accepted) {
        Err(DuplicateInvitation::AlreadyAccepted)
    } else if existing.contains(&InvitationStatus::Pending) {
        Err(DuplicateInvitation::AlreadyPending)
    } else {
        Ok(())
    }
}

/// Send-invitation form as submitted.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct InvitationForm {
    #[validate(email(message = "Enter a valid email address."))]
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub property_id: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvitationInput {
    pub email: String,
    pub property_id: Uuid,
}

impl InvitationForm {
    /// Cleans the form; `property_id` must be one of `allowed_properties`.
    pub fn clean(&self, allowed_properties: &[Uuid]) -> Result<InvitationInput, FormErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FormErrors::new(),
            Err(e) => FormErrors::from(e),
        };

        let property_id = match Uuid::parse_str(self.property_id.trim()) {
            Ok(id) if allowed_properties.contains(&id) => Some(id),
            _ => {
                errors.add(
                    "property_id",
                    "Select a valid choice. That choice is not one of the available choices.",
                );
                None
            }
        };

        match property_id {
            Some(property_id) if errors.is_empty() => Ok(InvitationInput {
                email: normalize_email(&self.email),
                property_id,
            }),
            _ => Err(errors),
        }
    }
}

/// Acceptance form. Passwords are only required when no account exists yet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AcceptInvitationForm {
    #[serde(default)]
    pub password: String,

    #[serde(default)]
    pub password_confirm: String,
}

impl AcceptInvitationForm {
    /// Validates the password for a new account registered under `email`.
    pub fn clean_new_account(&self, email: &str) -> Result<String, FormErrors> {
        clean_new_password(&self.password, &self.password_confirm, email)
            .into_result(self.password.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invitation(status: InvitationStatus, expires_in_days: i64) -> Invitation {
        let now = Utc::now();
        Invitation {
            id: Uuid::new_v4(),
            email: "tenant@example.com".to_string(),
            property_id: Uuid::new_v4(),
            landlord_id: Uuid::new_v4(),
            token: Uuid::new_v4(),
            status,
            created_at: now - Duration::days(1),
            expires_at: now + Duration::days(expires_in_days),
        }
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            InvitationStatus::Pending,
            InvitationStatus::Accepted,
            InvitationStatus::Rejected,
            InvitationStatus::Expired,
        ] {
            assert_eq!(InvitationStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert_eq!(InvitationStatus::Rejected.label(), "Rejected");
    }

    #[test]
    fn test_overdue_only_when_pending_and_past_expiry() {
        let now = Utc::now();
        assert!(invitation(InvitationStatus::Pending, -1).is_overdue(now));
        assert!(!invitation(InvitationStatus::Pending, 3).is_overdue(now));
        assert!(!invitation(InvitationStatus::Accepted, -1).is_overdue(now));
    }

    #[test]
    fn test_effective_status() {
        let now = Utc::now();
        assert_eq!(
            invitation(InvitationStatus::Pending, -1).effective_status(now),
            InvitationStatus::Expired
        );
        assert_eq!(
            invitation(InvitationStatus::Rejected, -1).effective_status(now),
            InvitationStatus::Rejected
        );
    }

    #[test]
    fn test_can_resend() {
        assert!(invitation(InvitationStatus::Pending, 1).can_resend());
        assert!(invitation(InvitationStatus::Expired, -1).can_resend());
        assert!(!invitation(InvitationStatus::Accepted, 1).can_resend());
        assert!(!invitation(InvitationStatus::Rejected, 1).can_resend());
    }

    #[test]
    fn test_is_actionable() {
        let now = Utc::now();
        assert!(invitation(InvitationStatus::Pending, 1).is_actionable(now));
        assert!(!invitation(InvitationStatus::Pending, -1).is_actionable(now));
        assert!(!invitation(InvitationStatus::Accepted, 1).is_actionable(now));
    }

    #[test]
    fn test_invitation_expiry_default_seven_days() {
        let issued = Utc::now();
        let expires = invitation_expiry(issued, DEFAULT_INVITATION_EXPIRY_DAYS);
        assert_eq!((expires - issued).num_days(), 7);
    }

    #[test]
    fn test_check_duplicate() {
        assert!(check_duplicate(&[]).is_ok());
        assert!(check_duplicate(&[InvitationStatus::Expired, InvitationStatus::Rejected]).is_ok());
        assert_eq!(
            check_duplicate(&[InvitationStatus::Pending]),
            Err(DuplicateInvitation::AlreadyPending)
        );
        assert_eq!(
            check_duplicate(&[InvitationStatus::Pending, InvitationStatus::Accepted]),
            Err(DuplicateInvitation::AlreadyAccepted)
        );
    }

    #[test]
    fn test_invitation_form_clean() {
        let property_id = Uuid::new_v4();
        let form = InvitationForm {
            email: "New.Tenant@Example.com".to_string(),
            property_id: property_id.to_string(),
        };
        let input = form.clean(&[property_id]).unwrap();
        assert_eq!(input.email, "new.tenant@example.com");
        assert_eq!(input.property_id, property_id);
    }

    #[test]
    fn test_invitation_form_rejects_foreign_property() {
        let form = InvitationForm {
            email: "tenant@example.com".to_string(),
            property_id: Uuid::new_v4().to_string(),
        };
        let errors = form.clean(&[Uuid::new_v4()]).unwrap_err();
        assert!(errors.has("property_id"));
        assert!(!errors.has("email"));
    }

    #[test]
    fn test_invitation_form_rejects_bad_email_and_garbage_id() {
        let form = InvitationForm {
            email: "nope".to_string(),
            property_id: "42".to_string(),
        };
        let errors = form.clean(&[]).unwrap_err();
        assert!(errors.has("email"));
        assert!(errors.has("property_id"));
    }

    #[test]
    fn test_accept_form_new_account() {
        let form = AcceptInvitationForm {
            password: "green-door-77".to_string(),
            password_confirm: "green-door-77".to_string(),
        };
        assert_eq!(form.clean_new_account("t@example.com").unwrap(), "green-door-77");

        let mismatch = AcceptInvitationForm {
            password: "green-door-77".to_string(),
            password_confirm: "green-door-78".to_string(),
        };
        assert!(mismatch
            .clean_new_account("t@example.com")
            .unwrap_err()
            .has("password_confirm"));
    }
}
