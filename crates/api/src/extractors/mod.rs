//! Custom Axum extractors.
//!
//! Session authentication, CSRF-checked forms and the page rendering context.

pub mod csrf;
mod page;
pub mod session;

pub use csrf::{CsrfForm, NoFields};
pub use session::{CurrentUser, LandlordUser, MaybeUser};
