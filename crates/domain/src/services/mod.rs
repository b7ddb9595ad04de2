//! Domain services for Property Manager.
//!
//! Services contain business rules that operate on domain models.

pub mod authorization;
pub mod tax;

pub use authorization::{Access, Actor};
pub use tax::TaxAssessment;
