use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::{AchievementUnlock, LeaderboardRow, SpecialBadgeGrant, UserProfile, UserStats};

/// The decayed-streak sort key, shared verbatim between the leaderboard and
/// the top-user query so board order and champion eligibility cannot diverge.
/// A streak older than one UTC calendar day counts as zero.
///
/// The CASE expression is the SQL rendition of
/// `qz_srs::streak::effective_streak`; keep the two in lockstep.
const RANK_ORDER: &str = r#"
    CASE WHEN s.last_study_date IS NULL
              OR s.last_study_date::date < CURRENT_DATE - 1
         THEN 0 ELSE s.current_streak END DESC,
    s.total_cards_studied DESC,
    s.longest_streak DESC
"#;

pub async fn get_user<'e, E>(executor: E, user_id: Uuid) -> Result<Option<UserProfile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, role, avatar, created_at
            FROM users
            WHERE id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn get_user_by_username<'e, E>(
    executor: E,
    username: &str,
) -> Result<Option<UserProfile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, role, avatar, created_at
            FROM users
            WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(executor)
    .await
}

/// All users, newest first (admin badge-granting surface).
pub async fn list_users<'e, E>(executor: E) -> Result<Vec<UserProfile>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, username, email, role, avatar, created_at
            FROM users
            ORDER BY created_at DESC
        "#,
    )
    .fetch_all(executor)
    .await
}

/// Read a user's stats row without locking it.
pub async fn get_stats<'e, E>(executor: E, user_id: Uuid) -> Result<Option<UserStats>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, total_cards_studied, total_quizzes_taken, total_correct_answers,
                   current_streak, longest_streak, last_study_date, cards_studied_today,
                   last_card_date, streak_updated_today
            FROM user_stats
            WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

/// Materialize the stats row if missing (defaults all zero).
pub async fn ensure_stats<'e, E>(executor: E, user_id: Uuid) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO user_stats (user_id)
            VALUES ($1)
            ON CONFLICT (user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(())
}

/// Read the stats row with a row lock, serializing concurrent reviews for
/// the same user. Must run inside a transaction.
pub async fn get_stats_for_update<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<UserStats, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, total_cards_studied, total_quizzes_taken, total_correct_answers,
                   current_streak, longest_streak, last_study_date, cards_studied_today,
                   last_card_date, streak_updated_today
            FROM user_stats
            WHERE user_id = $1
            FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
}

/// Write back the whole aggregate after the review flow has transformed it.
pub async fn save_stats<'e, E>(executor: E, stats: &UserStats) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            UPDATE user_stats
            SET total_cards_studied = $2,
                total_quizzes_taken = $3,
                total_correct_answers = $4,
                current_streak = $5,
                longest_streak = $6,
                last_study_date = $7,
                cards_studied_today = $8,
                last_card_date = $9,
                streak_updated_today = $10,
                updated_at = NOW()
            WHERE user_id = $1
        "#,
    )
    .bind(stats.user_id)
    .bind(stats.total_cards_studied)
    .bind(stats.total_quizzes_taken)
    .bind(stats.total_correct_answers)
    .bind(stats.current_streak)
    .bind(stats.longest_streak)
    .bind(stats.last_study_date)
    .bind(stats.cards_studied_today)
    .bind(stats.last_card_date)
    .bind(stats.streak_updated_today)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list_achievements<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<AchievementUnlock>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT achievement_id, unlocked_at
            FROM user_achievements
            WHERE user_id = $1
            ORDER BY unlocked_at
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// Append an achievement id to the unlock set. Returns false when the id was
/// already present; the set only ever grows.
pub async fn unlock_achievement<'e, E>(
    executor: E,
    user_id: Uuid,
    achievement_id: &str,
    unlocked_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO user_achievements (user_id, achievement_id, unlocked_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, achievement_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(achievement_id)
    .bind(unlocked_at)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_special_badges<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<SpecialBadgeGrant>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT badge_id, granted_at, granted_by
            FROM special_badges
            WHERE user_id = $1
            ORDER BY granted_at
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}

/// Admin side channel: record a badge grant. Returns false when the user
/// already holds the badge.
pub async fn grant_special_badge<'e, E>(
    executor: E,
    user_id: Uuid,
    badge_id: &str,
    granted_by: Uuid,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO special_badges (user_id, badge_id, granted_at, granted_by)
            VALUES ($1, $2, NOW(), $3)
            ON CONFLICT (user_id, badge_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(badge_id)
    .bind(granted_by)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Admin side channel: remove a badge. Returns false when the user did not
/// hold it.
pub async fn revoke_special_badge<'e, E>(
    executor: E,
    user_id: Uuid,
    badge_id: &str,
) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = sqlx::query(
        // language=PostgreSQL
        r#"
            DELETE FROM special_badges
            WHERE user_id = $1 AND badge_id = $2
        "#,
    )
    .bind(user_id)
    .bind(badge_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Top users by the decayed-streak sort key.
pub async fn leaderboard<'e, E>(executor: E, limit: i64) -> Result<Vec<LeaderboardRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        // language=PostgreSQL
        r#"
            SELECT u.id AS user_id, u.username, u.avatar,
                   s.total_cards_studied,
                   CASE WHEN s.last_study_date IS NULL
                             OR s.last_study_date::date < CURRENT_DATE - 1
                        THEN 0 ELSE s.current_streak END AS effective_streak,
                   s.longest_streak,
                   (SELECT COUNT(*) FROM user_achievements a WHERE a.user_id = u.id)
                       AS achievements_count
            FROM users u
            JOIN user_stats s ON s.user_id = u.id
            ORDER BY {RANK_ORDER}
            LIMIT $1
        "#
    );
    sqlx::query_as(&query).bind(limit).fetch_all(executor).await
}

/// The single top-ranked user under the same ordering as [`leaderboard`].
/// This is the authority for champion eligibility.
pub async fn top_ranked_user<'e, E>(executor: E) -> Result<Option<Uuid>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let query = format!(
        // language=PostgreSQL
        r#"
            SELECT u.id
            FROM users u
            JOIN user_stats s ON s.user_id = u.id
            ORDER BY {RANK_ORDER}
            LIMIT 1
        "#
    );
    sqlx::query_scalar(&query).fetch_optional(executor).await
}
