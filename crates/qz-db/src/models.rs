use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;

/// A user account (auth fields live elsewhere; this is what the study core
/// and the admin surface read).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    /// "user" or "admin"
    pub role: String,
    pub avatar: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Per-user gamification aggregate. One row per user, mutated only inside
/// the review transaction.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct UserStats {
    pub user_id: Uuid,
    pub total_cards_studied: i32,
    pub total_quizzes_taken: i32,
    pub total_correct_answers: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    /// Date of the last streak-qualifying day.
    pub last_study_date: Option<DateTime<Utc>>,
    pub cards_studied_today: i32,
    /// Timestamp of the last card event, used to detect day rollover.
    pub last_card_date: Option<DateTime<Utc>>,
    /// Latch: at most one streak increment per local day.
    pub streak_updated_today: bool,
}

/// One side of a flashcard pair inside a set's ordered card array.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flashcard {
    pub front: String,
    pub back: String,
}

/// A card set. The card array is ordered; cards are addressed by index.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FlashcardSet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub is_public: bool,
    pub cards: Json<Vec<Flashcard>>,
}

/// Scheduling state for one (user, set, card-index) triple.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CardProgress {
    pub user_id: Uuid,
    pub set_id: Uuid,
    pub card_index: i32,
    /// Flips false -> true exactly once; tied 1:1 to the lifetime counter.
    pub is_studied: bool,
    pub ease_factor: f64,
    pub interval_days: i32,
    pub repetitions: i32,
    pub next_review_date: DateTime<Utc>,
    pub last_review_date: Option<DateTime<Utc>>,
}

/// An unlocked achievement id with its unlock time. Append-only.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AchievementUnlock {
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// An admin-granted special badge. Disjoint from achievements.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SpecialBadgeGrant {
    pub badge_id: String,
    pub granted_at: DateTime<Utc>,
    pub granted_by: Uuid,
}

/// One leaderboard row, ordered by the decayed-streak sort key.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeaderboardRow {
    pub user_id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
    pub total_cards_studied: i32,
    /// Streak after query-time decay; this is what the board ranks by.
    pub effective_streak: i32,
    pub longest_streak: i32,
    pub achievements_count: i64,
}
