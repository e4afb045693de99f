//! Identity context for the study core.
//!
//! Token issuance (login, registration) lives outside this service; what the
//! core needs is an authenticated user id on every request, plus an admin
//! flag for the badge side channel.

pub mod jwt;
pub mod middleware;

pub use middleware::{AdminUser, AuthUser};
