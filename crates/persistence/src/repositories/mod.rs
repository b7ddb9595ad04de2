//! Repository implementations for database operations.

pub mod invitation;
pub mod lease;
pub mod message;
pub mod payment;
pub mod property;
pub mod reminder;
pub mod user;

pub use invitation::{AcceptOutcome, InvitationRepository};
pub use lease::RentalAgreementRepository;
pub use message::MessageRepository;
pub use payment::PaymentRepository;
pub use property::PropertyRepository;
pub use reminder::ReminderRepository;
pub use user::UserRepository;
