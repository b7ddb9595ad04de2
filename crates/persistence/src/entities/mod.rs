//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod invitation;
pub mod lease;
pub mod message;
pub mod payment;
pub mod property;
pub mod reminder;
pub mod user;

pub use invitation::{InvitationDetailEntity, InvitationEntity, InvitationStatusDb};
pub use lease::{RentalAgreementDetailEntity, RentalAgreementEntity};
pub use message::{ConversationEntity, MessageEntity, RecipientEntity};
pub use payment::{PaymentDetailEntity, PaymentEntity, PaymentStatusDb};
pub use property::{PropertyEntity, PropertyStatusDb};
pub use reminder::{ReminderDetailEntity, ReminderEntity};
pub use user::{
    ContactEntity, LandlordProfileEntity, TenantProfileEntity, UserEntity, UserRoleDb,
    UserSessionEntity,
};
