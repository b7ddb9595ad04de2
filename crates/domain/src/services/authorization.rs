//! Role and ownership policies.
//!
//! Every page decides visibility through these functions so the rules live
//! in one place:
//!
//! | action                         | tenant | landlord       | administrator |
//! |--------------------------------|--------|----------------|---------------|
//! | list properties                | no     | own            | all           |
//! | view/edit/delete property      | no     | own            | any           |
//! | create property                | no     | yes            | no            |
//! | invitations, reminders, tenants| no     | own            | no            |
//! | agreements, payments           | no     | own            | no            |
//! | own payment history            | yes    | no             | no            |
//! | edit profile                   | yes    | yes            | no            |

use uuid::Uuid;

use crate::models::UserRole;

/// The authenticated user a decision is made for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self { user_id, role }
    }
}

/// Outcome of an access check on a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    /// The role may never perform the action.
    Forbidden,
    /// The row exists but is not visible to this user.
    NotFound,
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allowed)
    }
}

/// Whether the property list page is available at all.
pub fn can_list_properties(role: UserRole) -> bool {
    matches!(role, UserRole::Landlord | UserRole::Administrator)
}

/// Administrators see every property; landlords only their own.
pub fn sees_all_properties(role: UserRole) -> bool {
    role == UserRole::Administrator
}

pub fn can_create_property(role: UserRole) -> bool {
    role == UserRole::Landlord
}

/// Detail, update and delete of a property owned by `owner_id`.
pub fn property_access(actor: Actor, owner_id: Uuid) -> Access {
    match actor.role {
        UserRole::Administrator => Access::Allowed,
        UserRole::Landlord if actor.user_id == owner_id => Access::Allowed,
        UserRole::Landlord => Access::NotFound,
        UserRole::Tenant => Access::Forbidden,
    }
}

/// Invitations, reminders, agreements, payments and the tenant list are
/// landlord tools.
pub fn can_manage_tenancy(role: UserRole) -> bool {
    role == UserRole::Landlord
}

/// Access to an invitation or reminder whose property belongs to `owner_id`.
pub fn tenancy_access(actor: Actor, owner_id: Uuid) -> Access {
    if !can_manage_tenancy(actor.role) {
        Access::Forbidden
    } else if actor.user_id == owner_id {
        Access::Allowed
    } else {
        Access::NotFound
    }
}

/// The read-only "my payments" page.
pub fn can_view_own_payments(role: UserRole) -> bool {
    role == UserRole::Tenant
}

/// Administrators have no profile to edit.
pub fn can_edit_profile(role: UserRole) -> bool {
    matches!(role, UserRole::Tenant | UserRole::Landlord)
}

/// A conversation is open to someone the sender may address from the
/// compose screen, or to anyone they already exchanged messages with.
/// Nobody may message themselves.
pub fn can_message(
    sender_id: Uuid,
    recipient_id: Uuid,
    is_allowed_recipient: bool,
    has_history: bool,
) -> bool {
    sender_id != recipient_id && (is_allowed_recipient || has_history)
}
