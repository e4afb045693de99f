use chrono::{DateTime, Utc};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::CardProgress;

/// Fetch scheduling state for one card. `None` means the card has never been
/// reviewed; callers materialize the virtual default (immediately due).
pub async fn get_card_progress<'e, E>(
    executor: E,
    user_id: Uuid,
    set_id: Uuid,
    card_index: i32,
) -> Result<Option<CardProgress>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, set_id, card_index, is_studied, ease_factor,
                   interval_days, repetitions, next_review_date, last_review_date
            FROM card_progress
            WHERE user_id = $1 AND set_id = $2 AND card_index = $3
        "#,
    )
    .bind(user_id)
    .bind(set_id)
    .bind(card_index)
    .fetch_optional(executor)
    .await
}

/// All progress records a user has for one set, for the due-card listing.
pub async fn list_set_progress<'e, E>(
    executor: E,
    user_id: Uuid,
    set_id: Uuid,
) -> Result<Vec<CardProgress>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT user_id, set_id, card_index, is_studied, ease_factor,
                   interval_days, repetitions, next_review_date, last_review_date
            FROM card_progress
            WHERE user_id = $1 AND set_id = $2
        "#,
    )
    .bind(user_id)
    .bind(set_id)
    .fetch_all(executor)
    .await
}

/// Write back one card's scheduling state. Concurrent reviews of the same
/// card race last-write-wins, which is acceptable for human-paced input.
pub async fn upsert_card_progress<'e, E>(
    executor: E,
    progress: &CardProgress,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query(
        // language=PostgreSQL
        r#"
            INSERT INTO card_progress (user_id, set_id, card_index, is_studied,
                ease_factor, interval_days, repetitions, next_review_date, last_review_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (user_id, set_id, card_index)
            DO UPDATE SET
                is_studied = $4,
                ease_factor = $5,
                interval_days = $6,
                repetitions = $7,
                next_review_date = $8,
                last_review_date = $9
        "#,
    )
    .bind(progress.user_id)
    .bind(progress.set_id)
    .bind(progress.card_index)
    .bind(progress.is_studied)
    .bind(progress.ease_factor)
    .bind(progress.interval_days)
    .bind(progress.repetitions)
    .bind(progress.next_review_date)
    .bind(progress.last_review_date)
    .execute(executor)
    .await?;
    Ok(())
}

/// Lifetime count of distinct cards a user has studied.
pub async fn count_studied<'e, E>(executor: E, user_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*) FROM card_progress
            WHERE user_id = $1 AND is_studied
        "#,
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
}

/// Cards due at or before `now`, across all of a user's sets.
pub async fn count_due<'e, E>(
    executor: E,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_scalar(
        // language=PostgreSQL
        r#"
            SELECT COUNT(*) FROM card_progress
            WHERE user_id = $1 AND next_review_date <= $2
        "#,
    )
    .bind(user_id)
    .bind(now)
    .fetch_one(executor)
    .await
}
