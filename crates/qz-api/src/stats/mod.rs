//! User-facing gamification surface: profile stats, achievement status,
//! the leaderboard and the claimable newcomer quest.

pub mod routes;

pub use routes::routes;
