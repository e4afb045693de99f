pub mod achievements;
pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod jobs;
pub mod metrics;
pub mod router;
pub mod state;
pub mod stats;
pub mod study;
pub mod tracing;
pub mod validation;

pub use config::ApiConfig;
pub use state::ApiState;
