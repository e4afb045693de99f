use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use chrono::Utc;
use uuid::Uuid;

use qz_db::{
    models::{CardProgress, FlashcardSet, UserStats},
    repositories::{progress, sets, users},
};
use qz_srs::{Sm2State, StreakState};

use crate::{
    ApiState, achievements, auth::AuthUser, error::ApiError, jobs, validation::validate_payload,
};

use super::model::{DueCard, DueCardsResponse, ReviewResponse, ReviewSubmission, StudyOverview};

/// Create the study routes
pub fn routes() -> Router<ApiState> {
    Router::new()
        .route("/study/stats/overview", get(study_overview))
        .route("/study/{set_id}", get(get_due_cards))
        .route("/study/{set_id}/review", post(submit_review))
}

/// Owner always has access; everyone else only when the set is public.
fn check_set_access(set: &FlashcardSet, user_id: Uuid) -> Result<(), ApiError> {
    if set.user_id != user_id && !set.is_public {
        return Err(ApiError::AccessDenied);
    }
    Ok(())
}

fn streak_state(stats: &UserStats) -> StreakState {
    StreakState {
        current_streak: stats.current_streak,
        longest_streak: stats.longest_streak,
        last_study_date: stats.last_study_date,
        cards_studied_today: stats.cards_studied_today,
        last_card_date: stats.last_card_date,
        streak_updated_today: stats.streak_updated_today,
    }
}

fn apply_streak(stats: &mut UserStats, streak: StreakState) {
    stats.current_streak = streak.current_streak;
    stats.longest_streak = streak.longest_streak;
    stats.last_study_date = streak.last_study_date;
    stats.cards_studied_today = streak.cards_studied_today;
    stats.last_card_date = streak.last_card_date;
    stats.streak_updated_today = streak.streak_updated_today;
}

/// List the cards of a set that are due for review. Cards without a progress
/// record are treated as a virtual new card whose review date is "now", so
/// they are always due.
async fn get_due_cards(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(set_id): Path<Uuid>,
) -> Result<Json<DueCardsResponse>, ApiError> {
    let set = sets::get_set(&state.pool, set_id)
        .await?
        .ok_or(ApiError::NotFound("Set"))?;
    check_set_access(&set, auth_user.user_id)?;

    let now = Utc::now();
    let records = progress::list_set_progress(&state.pool, auth_user.user_id, set_id).await?;

    let cards: Vec<DueCard> = set
        .cards
        .0
        .iter()
        .enumerate()
        .filter_map(|(index, card)| {
            let index = index as i32;
            let is_due = records
                .iter()
                .find(|p| p.card_index == index)
                .is_none_or(|p| p.next_review_date <= now);
            is_due.then(|| DueCard {
                card_index: index,
                front: card.front.clone(),
                back: card.back.clone(),
                is_due,
            })
        })
        .collect();

    Ok(Json(DueCardsResponse {
        set_title: set.title,
        total_cards: set.cards.0.len(),
        due_cards: cards.len(),
        cards,
    }))
}

/// Submit one review for a card.
///
/// Everything the review mutates (scheduling state, the `is_studied`
/// transition and its 1:1 counter increment, streak fields, achievement
/// unlocks) happens in a single transaction; the stats row is read with a
/// row lock so concurrent reviews for the same user serialize. Only the
/// cross-user champion check escapes the transaction, as a fire-and-forget
/// task spawned once the outcome is committed.
async fn submit_review(
    auth_user: AuthUser,
    State(state): State<ApiState>,
    Path(set_id): Path<Uuid>,
    Json(payload): Json<ReviewSubmission>,
) -> Result<Json<ReviewResponse>, ApiError> {
    validate_payload(&payload)?;
    let offset_minutes = payload.timezone_offset.unwrap_or(0);
    let now = Utc::now();

    let mut tx = state.pool.begin().await?;

    let set = sets::get_set(&mut *tx, set_id)
        .await?
        .ok_or(ApiError::NotFound("Set"))?;
    check_set_access(&set, auth_user.user_id)?;
    if payload.card_index as usize >= set.cards.0.len() {
        return Err(ApiError::NotFound("Card"));
    }

    let existing =
        progress::get_card_progress(&mut *tx, auth_user.user_id, set_id, payload.card_index)
            .await?;
    let prior = existing.as_ref().map_or_else(Sm2State::default, |p| Sm2State {
        ease_factor: p.ease_factor,
        interval_days: p.interval_days,
        repetitions: p.repetitions,
    });
    let review = qz_srs::schedule(payload.quality, prior, now);

    users::ensure_stats(&mut *tx, auth_user.user_id).await?;
    let mut stats = users::get_stats_for_update(&mut *tx, auth_user.user_id).await?;

    // The lifetime counter increments exactly when is_studied flips
    if !existing.as_ref().is_some_and(|p| p.is_studied) {
        stats.total_cards_studied += 1;
    }
    if payload.quality >= qz_srs::sm2::PASS_THRESHOLD {
        stats.total_correct_answers += 1;
    }

    let mut streak = streak_state(&stats);
    qz_srs::track_card_studied(&mut streak, now, offset_minutes);
    apply_streak(&mut stats, streak);

    progress::upsert_card_progress(
        &mut *tx,
        &CardProgress {
            user_id: auth_user.user_id,
            set_id,
            card_index: payload.card_index,
            is_studied: true,
            ease_factor: review.state.ease_factor,
            interval_days: review.state.interval_days,
            repetitions: review.state.repetitions,
            next_review_date: review.next_review,
            last_review_date: Some(now),
        },
    )
    .await?;
    users::save_stats(&mut *tx, &stats).await?;

    let unlocked: Vec<String> = users::list_achievements(&mut *tx, auth_user.user_id)
        .await?
        .into_iter()
        .map(|a| a.achievement_id)
        .collect();
    let new_achievements = achievements::check_achievements(&unlocked, &stats);
    for achievement in &new_achievements {
        users::unlock_achievement(&mut *tx, auth_user.user_id, achievement.id, now).await?;
    }

    tx.commit().await?;

    // Cross-user rank query; must never delay or fail the response
    jobs::spawn_champion_check(state.pool.clone(), auth_user.user_id, &stats);

    Ok(Json(ReviewResponse {
        message: "Review recorded",
        next_review_date: review.next_review,
        interval: review.state.interval_days,
        cards_studied_today: stats.cards_studied_today,
        new_achievements,
    }))
}

/// Lifetime studied-card count and how many cards are due right now.
async fn study_overview(
    auth_user: AuthUser,
    State(state): State<ApiState>,
) -> Result<Json<StudyOverview>, ApiError> {
    let now = Utc::now();
    let total_cards_studied = progress::count_studied(&state.pool, auth_user.user_id).await?;
    let due_today = progress::count_due(&state.pool, auth_user.user_id, now).await?;

    Ok(Json(StudyOverview {
        total_cards_studied,
        due_today,
    }))
}
