//! Background work that runs after a review response is produced.
//!
//! The champion achievement needs a cross-user rank query, which is too
//! expensive (and too unrelated to the caller's own outcome) to sit on the
//! request path. It runs as a fire-and-forget task: failures are logged and
//! swallowed, never surfaced to the user whose review triggered it.

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use qz_db::{models::UserStats, repositories::users};

use crate::achievements::CHAMPION;

/// Candidates below these thresholds cannot plausibly hold the top rank, so
/// skip the cross-user query for them entirely.
const MIN_STREAK_FOR_CHECK: i32 = 3;
const MIN_CARDS_FOR_CHECK: i32 = 50;

/// Spawn the post-review champion check for `user_id`.
pub fn spawn_champion_check(pool: PgPool, user_id: Uuid, stats: &UserStats) {
    if stats.current_streak <= MIN_STREAK_FOR_CHECK
        && stats.total_cards_studied <= MIN_CARDS_FOR_CHECK
    {
        return;
    }

    tokio::spawn(async move {
        if let Err(e) = run_champion_check(&pool, user_id).await {
            tracing::error!("Champion check failed for user {user_id}: {e}");
        }
    });
}

/// Grant the champion achievement when `user_id` holds the top leaderboard
/// rank. Uses the same decayed-streak ordering as the public leaderboard,
/// so a user can never be rank 1 on the board yet ineligible here.
async fn run_champion_check(pool: &PgPool, user_id: Uuid) -> anyhow::Result<()> {
    let already_champion = users::list_achievements(pool, user_id)
        .await?
        .iter()
        .any(|a| a.achievement_id == CHAMPION);
    if already_champion {
        return Ok(());
    }

    if users::top_ranked_user(pool).await? == Some(user_id) {
        let newly = users::unlock_achievement(pool, user_id, CHAMPION, Utc::now()).await?;
        if newly {
            tracing::info!("User {user_id} unlocked the champion achievement");
        }
    }

    Ok(())
}
