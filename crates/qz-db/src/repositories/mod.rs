//! Repository functions, generic over [`sqlx::Executor`] so they run either
//! on the pool or inside a transaction.

pub mod progress;
pub mod sets;
pub mod users;
