use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use qz_db::{
    models::{AchievementUnlock, SpecialBadgeGrant, UserStats},
    repositories::users,
};

use crate::{
    ApiState,
    achievements::{self, ACHIEVEMENTS, Achievement, NEWCOMER, SPECIAL_BADGES},
    auth::AuthUser,
    error::ApiError,
};

/// Create the stats routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/stats/me", get(get_my_stats))
        .route("/stats/achievements", get(get_achievements))
        .route("/stats/leaderboard", get(get_leaderboard))
        .route("/stats/user/{username}", get(get_public_profile))
        .route("/stats/claim-quest", post(claim_quest))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsOut {
    total_cards_studied: i32,
    total_quizzes_taken: i32,
    total_correct_answers: i32,
    current_streak: i32,
    longest_streak: i32,
    cards_studied_today: i32,
}

impl StatsOut {
    fn from_stats(stats: Option<&UserStats>) -> Self {
        let zero = || Self {
            total_cards_studied: 0,
            total_quizzes_taken: 0,
            total_correct_answers: 0,
            current_streak: 0,
            longest_streak: 0,
            cards_studied_today: 0,
        };
        stats.map_or_else(zero, |s| Self {
            total_cards_studied: s.total_cards_studied,
            total_quizzes_taken: s.total_quizzes_taken,
            total_correct_answers: s.total_correct_answers,
            current_streak: s.current_streak,
            longest_streak: s.longest_streak,
            cards_studied_today: s.cards_studied_today,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MyStatsResponse {
    username: String,
    avatar: Option<String>,
    stats: StatsOut,
    achievements_count: usize,
    total_achievements: usize,
    special_badges_count: usize,
    total_special_badges: usize,
    member_since: DateTime<Utc>,
}

async fn get_my_stats(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<MyStatsResponse>, ApiError> {
    let user = users::get_user(&state.pool, auth_user.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    let stats = users::get_stats(&state.pool, auth_user.user_id).await?;
    let unlocked = users::list_achievements(&state.pool, auth_user.user_id).await?;
    let badges = users::list_special_badges(&state.pool, auth_user.user_id).await?;

    Ok(Json(MyStatsResponse {
        username: user.username,
        avatar: user.avatar,
        stats: StatsOut::from_stats(stats.as_ref()),
        achievements_count: unlocked.len(),
        total_achievements: ACHIEVEMENTS.len(),
        special_badges_count: badges.len(),
        total_special_badges: SPECIAL_BADGES.len(),
        member_since: user.created_at,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AchievementStatus {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    unlocked: bool,
    unlocked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BadgeStatus {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    unlocked: bool,
    granted_at: Option<DateTime<Utc>>,
}

fn achievements_status(unlocked: &[AchievementUnlock]) -> Vec<AchievementStatus> {
    ACHIEVEMENTS
        .iter()
        .map(|a| {
            let unlock = unlocked.iter().find(|u| u.achievement_id == a.id);
            AchievementStatus {
                id: a.id,
                name: a.name,
                description: a.description,
                icon: a.icon,
                unlocked: unlock.is_some(),
                unlocked_at: unlock.map(|u| u.unlocked_at),
            }
        })
        .collect()
}

fn badges_status(granted: &[SpecialBadgeGrant]) -> Vec<BadgeStatus> {
    SPECIAL_BADGES
        .iter()
        .map(|b| {
            let grant = granted.iter().find(|g| g.badge_id == b.id);
            BadgeStatus {
                id: b.id,
                name: b.name,
                description: b.description,
                icon: b.icon,
                unlocked: grant.is_some(),
                granted_at: grant.map(|g| g.granted_at),
            }
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AchievementsResponse {
    achievements: Vec<AchievementStatus>,
    special_badges: Vec<BadgeStatus>,
}

/// All achievements and special badges with this user's unlock status.
async fn get_achievements(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<AchievementsResponse>, ApiError> {
    let unlocked = users::list_achievements(&state.pool, auth_user.user_id).await?;
    let badges = users::list_special_badges(&state.pool, auth_user.user_id).await?;

    Ok(Json(AchievementsResponse {
        achievements: achievements_status(&unlocked),
        special_badges: badges_status(&badges),
    }))
}

#[derive(Debug, Deserialize)]
struct LeaderboardQuery {
    limit: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LeaderboardEntry {
    rank: usize,
    username: String,
    avatar: Option<String>,
    cards_studied: i32,
    streak: i32,
    longest_streak: i32,
    achievements_count: i64,
}

/// Top users ranked by effective (decayed) streak, then lifetime cards, then
/// longest streak. The same ordering decides champion eligibility.
async fn get_leaderboard(
    _auth_user: AuthUser,
    State(state): State<ApiState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError> {
    let limit = query.limit.unwrap_or(20).clamp(1, 100);
    let rows = users::leaderboard(&state.pool, limit).await?;

    let entries = rows
        .into_iter()
        .enumerate()
        .map(|(i, row)| LeaderboardEntry {
            rank: i + 1,
            username: row.username,
            avatar: row.avatar,
            cards_studied: row.total_cards_studied,
            streak: row.effective_streak,
            longest_streak: row.longest_streak,
            achievements_count: row.achievements_count,
        })
        .collect();

    Ok(Json(entries))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicProfileResponse {
    username: String,
    avatar: Option<String>,
    stats: StatsOut,
    achievements: Vec<AchievementStatus>,
    special_badges: Vec<BadgeStatus>,
    member_since: DateTime<Utc>,
}

/// A user's public profile: stats plus only the unlocked achievements and
/// badges.
async fn get_public_profile(
    State(state): State<ApiState>,
    Path(username): Path<String>,
) -> Result<Json<PublicProfileResponse>, ApiError> {
    let user = users::get_user_by_username(&state.pool, &username)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    let stats = users::get_stats(&state.pool, user.id).await?;
    let unlocked = users::list_achievements(&state.pool, user.id).await?;
    let badges = users::list_special_badges(&state.pool, user.id).await?;

    Ok(Json(PublicProfileResponse {
        username: user.username,
        avatar: user.avatar,
        stats: StatsOut::from_stats(stats.as_ref()),
        achievements: achievements_status(&unlocked)
            .into_iter()
            .filter(|a| a.unlocked)
            .collect(),
        special_badges: badges_status(&badges)
            .into_iter()
            .filter(|b| b.unlocked)
            .collect(),
        member_since: user.created_at,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClaimQuestResponse {
    success: bool,
    message: &'static str,
    badge: &'static Achievement,
}

/// Idempotent grant of the newcomer achievement: claiming twice is a no-op
/// success, not an error.
async fn claim_quest(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<ClaimQuestResponse>, ApiError> {
    let badge = achievements::find(NEWCOMER).ok_or(ApiError::NotFound("Achievement"))?;

    let newly_unlocked =
        users::unlock_achievement(&state.pool, auth_user.user_id, NEWCOMER, Utc::now()).await?;

    Ok(Json(ClaimQuestResponse {
        success: true,
        message: if newly_unlocked {
            "Achievement granted"
        } else {
            "Achievement already owned"
        },
        badge,
    }))
}
