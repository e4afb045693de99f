use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use qz_db::repositories::users;

use crate::{
    ApiState,
    achievements::{self, SPECIAL_BADGES, SpecialBadge},
    auth::AdminUser,
    error::ApiError,
};

/// Create the admin routes; every handler requires the admin role.
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/admin/users", get(list_users))
        .route("/admin/badges", get(list_badges))
        .route("/admin/badge/grant", post(grant_badge))
        .route("/admin/badge/revoke", post(revoke_badge))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AdminUserRow {
    id: Uuid,
    username: String,
    email: String,
    role: String,
    avatar: Option<String>,
    special_badges: Vec<String>,
    created_at: DateTime<Utc>,
}

/// All users with their currently held badge ids, newest account first.
async fn list_users(
    _admin: AdminUser,
    State(state): State<ApiState>,
) -> Result<Json<Vec<AdminUserRow>>, ApiError> {
    let profiles = users::list_users(&state.pool).await?;

    let mut rows = Vec::with_capacity(profiles.len());
    for profile in profiles {
        let badges = users::list_special_badges(&state.pool, profile.id).await?;
        rows.push(AdminUserRow {
            id: profile.id,
            username: profile.username,
            email: profile.email,
            role: profile.role,
            avatar: profile.avatar,
            special_badges: badges.into_iter().map(|b| b.badge_id).collect(),
            created_at: profile.created_at,
        });
    }

    Ok(Json(rows))
}

async fn list_badges(_admin: AdminUser) -> Json<&'static [SpecialBadge]> {
    Json(SPECIAL_BADGES)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BadgeRequest {
    user_id: Uuid,
    badge_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GrantResponse {
    message: String,
    badge: &'static SpecialBadge,
}

async fn grant_badge(
    admin: AdminUser,
    State(state): State<ApiState>,
    Json(payload): Json<BadgeRequest>,
) -> Result<Json<GrantResponse>, ApiError> {
    let badge = achievements::find_badge(&payload.badge_id)
        .ok_or_else(|| ApiError::Validation("Invalid badge ID".to_string()))?;

    let user = users::get_user(&state.pool, payload.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let granted =
        users::grant_special_badge(&state.pool, user.id, badge.id, admin.0.user_id).await?;
    if !granted {
        return Err(ApiError::Validation(
            "User already has this badge".to_string(),
        ));
    }

    Ok(Json(GrantResponse {
        message: format!("Badge \"{}\" granted to {}", badge.name, user.username),
        badge,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RevokeResponse {
    message: String,
}

async fn revoke_badge(
    _admin: AdminUser,
    State(state): State<ApiState>,
    Json(payload): Json<BadgeRequest>,
) -> Result<Json<RevokeResponse>, ApiError> {
    let user = users::get_user(&state.pool, payload.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let revoked = users::revoke_special_badge(&state.pool, user.id, &payload.badge_id).await?;
    if !revoked {
        return Err(ApiError::Validation(
            "User does not have this badge".to_string(),
        ));
    }

    Ok(Json(RevokeResponse {
        message: format!("Badge revoked from {}", user.username),
    }))
}
