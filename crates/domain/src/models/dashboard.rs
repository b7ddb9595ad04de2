//! Role-specific dashboard summaries.

use serde::Serialize;

use super::reminder::ReminderSummary;
use super::user::Contact;

/// What a landlord sees after logging in.
#[derive(Debug, Clone, Serialize)]
pub struct LandlordDashboard {
    pub property_count: i64,
    pub pending_invitation_count: i64,
    pub overdue_reminders: Vec<ReminderSummary>,
    pub unread_message_count: i64,
}

/// What a tenant sees after logging in.
#[derive(Debug, Clone, Serialize)]
pub struct TenantDashboard {
    pub unread_message_count: i64,
    pub landlords: Vec<Contact>,
}

/// What an administrator sees after logging in.
#[derive(Debug, Clone, Serialize)]
pub struct AdminDashboard {
    pub user_count: i64,
    pub property_count: i64,
    pub unread_message_count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub enum Dashboard {
    Landlord(LandlordDashboard),
    Tenant(TenantDashboard),
    Administrator(AdminDashboard),
}
