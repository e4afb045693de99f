//! The review flow: due-card listing, review submission and the study
//! overview. This is where the scheduler, the streak tracker and the
//! achievement engine meet the persistence layer.

pub mod model;
pub mod routes;

pub use routes::routes;
