//! Domain models for Property Manager.

pub mod dashboard;
pub mod form;
pub mod invitation;
pub mod lease;
pub mod message;
pub mod payment;
pub mod property;
pub mod reminder;
pub mod user;

pub use dashboard::{AdminDashboard, Dashboard, LandlordDashboard, TenantDashboard};
pub use form::FormErrors;
pub use invitation::{Invitation, InvitationStatus, InvitationSummary};
pub use lease::{AgreementDetails, AgreementSummary, RentalAgreement};
pub use message::{ConversationSummary, Message, Recipient};
pub use payment::{MonthlyPayments, Payment, PaymentReport, PaymentStatus, PaymentSummary, ReportPeriod};
pub use property::{Property, PropertyStatus};
pub use reminder::{Reminder, ReminderBadge, ReminderSummary};
pub use user::{Contact, LandlordProfile, TenantProfile, User, UserRole, UserSession};
