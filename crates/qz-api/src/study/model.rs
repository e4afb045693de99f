use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::achievements::Achievement;

/// Review submission payload. `timezone_offset` follows the JavaScript
/// `getTimezoneOffset` convention (minutes to subtract from UTC); absent
/// means UTC.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSubmission {
    #[validate(range(min = 0))]
    pub card_index: i32,
    #[validate(range(min = 0, max = 5))]
    pub quality: u8,
    #[validate(range(min = -840, max = 840))]
    pub timezone_offset: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub message: &'static str,
    pub next_review_date: DateTime<Utc>,
    pub interval: i32,
    pub cards_studied_today: i32,
    pub new_achievements: Vec<&'static Achievement>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueCard {
    pub card_index: i32,
    pub front: String,
    pub back: String,
    pub is_due: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DueCardsResponse {
    pub set_title: String,
    pub total_cards: usize,
    pub due_cards: usize,
    pub cards: Vec<DueCard>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyOverview {
    pub total_cards_studied: i64,
    pub due_today: i64,
}
