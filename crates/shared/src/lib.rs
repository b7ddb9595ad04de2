//! Shared utilities and common types for the Property Manager backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Token generation, hashing and HMAC signing
//! - Password hashing with Argon2id and the password policy
//! - HTML escaping for server-rendered pages
//! - Reusable field validators

pub mod crypto;
pub mod html;
pub mod password;
pub mod validation;
