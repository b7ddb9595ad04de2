//! HTTP route handlers.

pub mod agreements;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod invitations;
pub mod messages;
pub mod payments;
pub mod profile;
pub mod properties;
pub mod reminders;
pub mod static_assets;
pub mod tenants;

use crate::error::AppError;

/// Fallback for unknown paths.
pub async fn not_found() -> AppError {
    AppError::not_found()
}
