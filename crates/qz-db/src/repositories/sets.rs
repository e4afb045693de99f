use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::models::FlashcardSet;

/// Fetch a card set with its ordered card array. The study core treats sets
/// as read-only catalog data.
pub async fn get_set<'e, E>(executor: E, set_id: Uuid) -> Result<Option<FlashcardSet>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    sqlx::query_as(
        // language=PostgreSQL
        r#"
            SELECT id, user_id, title, description, is_public, cards
            FROM flashcard_sets
            WHERE id = $1
        "#,
    )
    .bind(set_id)
    .fetch_optional(executor)
    .await
}
