//! SRS (Spaced Repetition System) library for QuizDeck
//!
//! This crate provides the core spaced repetition algorithm (SM-2) and the
//! daily streak arithmetic used when scheduling flashcard reviews. Both are
//! pure: `now` is always an explicit parameter and no I/O happens here.

pub mod sm2;
pub mod streak;

pub use sm2::{Sm2Review, Sm2State, schedule};
pub use streak::{DAILY_STREAK_GOAL, StreakState, effective_streak, track_card_studied};
