//! The SM-2 scheduling rule.
//!
//! Given a self-rated recall quality (0-5) and the card's prior scheduling
//! state, compute the next interval, ease factor, repetition count and
//! review date.

use chrono::{DateTime, Duration, Utc};

/// Lower bound for the ease factor. SM-2 never lets ease drop below this.
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Qualities at or above this value count as a successful recall.
pub const PASS_THRESHOLD: u8 = 3;

/// Highest accepted quality rating.
pub const MAX_QUALITY: u8 = 5;

/// Scheduling state of a single card prior to a review.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2State {
    pub ease_factor: f64,
    /// Current interval in days.
    pub interval_days: i32,
    /// Number of consecutive successful reviews.
    pub repetitions: i32,
}

impl Default for Sm2State {
    /// State of a card that has never been reviewed: immediately due.
    fn default() -> Self {
        Self {
            ease_factor: 2.5,
            interval_days: 0,
            repetitions: 0,
        }
    }
}

/// Outcome of applying one review to an [`Sm2State`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sm2Review {
    pub state: Sm2State,
    pub next_review: DateTime<Utc>,
}

/// Apply one review of the given `quality` to `prior`.
///
/// Callers must validate `quality` to the closed interval 0-5 before this
/// point; the function itself is total over that range.
///
/// On a pass (`quality >= 3`) the interval ladder is 1 day, then 6 days,
/// then `round(interval * ease)` using the ease factor *before* this
/// review's adjustment. On a fail the repetition count resets and the card
/// comes back tomorrow. The ease factor is adjusted afterwards in both
/// branches and clamped at [`MIN_EASE_FACTOR`].
pub fn schedule(quality: u8, prior: Sm2State, now: DateTime<Utc>) -> Sm2Review {
    let (interval_days, repetitions) = if quality >= PASS_THRESHOLD {
        let interval = match prior.repetitions {
            0 => 1,
            1 => 6,
            _ => (f64::from(prior.interval_days) * prior.ease_factor).round() as i32,
        };
        (interval, prior.repetitions + 1)
    } else {
        (1, 0)
    };

    // EF' = EF + (0.1 - (5 - q) * (0.08 + (5 - q) * 0.02))
    let q = f64::from(quality);
    let ease_factor =
        (prior.ease_factor + (0.1 - (5.0 - q) * (0.08 + (5.0 - q) * 0.02))).max(MIN_EASE_FACTOR);

    Sm2Review {
        state: Sm2State {
            ease_factor,
            interval_days,
            repetitions,
        },
        next_review: now + Duration::days(i64::from(interval_days)),
    }
}
