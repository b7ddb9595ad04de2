//! Server-rendered HTML pages.
//!
//! Every interpolated value goes through `shared::html::escape`.

pub mod agreements;
pub mod auth;
pub mod components;
pub mod dashboard;
pub mod errors;
pub mod invitations;
pub mod layout;
pub mod messages;
pub mod payments;
pub mod profile;
pub mod properties;
pub mod reminders;
pub mod tenants;

pub use layout::{NavUser, Page};
