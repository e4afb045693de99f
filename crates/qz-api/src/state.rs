use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sqlx::PgPool;

use crate::config::{ApiConfig, Environment};

/// Shared application state handed to every route handler.
#[derive(Clone)]
pub struct ApiState {
    pub jwt_secret: String,
    pub cookie_key: Key,
    pub pool: PgPool,
    pub environment: Environment,
}

impl ApiState {
    pub fn new(config: &ApiConfig, pool: PgPool) -> Self {
        Self {
            jwt_secret: config.jwt_secret.clone(),
            cookie_key: Key::from(config.cookie_secret.as_bytes()),
            pool,
            environment: config.env,
        }
    }
}

impl FromRef<ApiState> for Key {
    fn from_ref(state: &ApiState) -> Self {
        state.cookie_key.clone()
    }
}

/// The subset of state the auth extractors need.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
}

impl FromRef<ApiState> for AuthConfig {
    fn from_ref(state: &ApiState) -> Self {
        Self {
            jwt_secret: state.jwt_secret.clone(),
        }
    }
}
