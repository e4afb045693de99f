//! Administrative side channel for special badges, entirely separate from
//! the auto-unlocked achievement mechanism.

pub mod routes;

pub use routes::routes;
