//! Services shared by the route handlers.

pub mod admin_bootstrap;
pub mod cookies;
pub mod email;
pub mod flash;
