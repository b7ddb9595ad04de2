//! Domain layer for the Property Manager backend.
//!
//! This crate contains:
//! - Domain models (User, Property, Invitation, Reminder, Message)
//! - Form types with their validation rules
//! - Role policies and other pure business rules

pub mod models;
pub mod services;
