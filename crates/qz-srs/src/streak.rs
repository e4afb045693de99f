//! Daily activity tracking and consecutive-day streaks.
//!
//! A streak day is only "earned" once [`DAILY_STREAK_GOAL`] cards have been
//! studied within one local calendar day. Day boundaries are computed by
//! shifting timestamps by a caller-supplied timezone offset (minutes to
//! subtract from UTC, the JavaScript `getTimezoneOffset` convention) and
//! truncating to a date, so behavior does not depend on the host locale.

use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Cards that must be studied in one local day before the streak counts it.
pub const DAILY_STREAK_GOAL: i32 = 10;

/// The mutable per-user streak fields, lifted out of the stats aggregate so
/// the update rule stays a pure transform.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreakState {
    pub current_streak: i32,
    pub longest_streak: i32,
    /// Date of the last streak-qualifying day.
    pub last_study_date: Option<DateTime<Utc>>,
    pub cards_studied_today: i32,
    /// Timestamp of the last card event, used to detect day rollover.
    pub last_card_date: Option<DateTime<Utc>>,
    /// Latch preventing more than one streak increment per local day.
    pub streak_updated_today: bool,
}

/// Local calendar day of `ts` under `offset_minutes`.
fn local_day(ts: DateTime<Utc>, offset_minutes: i32) -> NaiveDate {
    (ts - Duration::minutes(i64::from(offset_minutes))).date_naive()
}

/// Record one studied card at `now` and update the streak if the daily goal
/// is reached.
///
/// Idempotent with respect to the streak itself: within one local day the
/// streak-day update runs at most once, no matter how many cards come in.
/// The first card of a new local day resets `cards_studied_today` and clears
/// the latch before counting itself.
pub fn track_card_studied(state: &mut StreakState, now: DateTime<Utc>, offset_minutes: i32) {
    let today = local_day(now, offset_minutes);

    match state.last_card_date {
        Some(last) if local_day(last, offset_minutes) == today => {
            state.cards_studied_today += 1;
        }
        _ => {
            // New day (or first card ever): stale counters reset
            state.cards_studied_today = 1;
            state.streak_updated_today = false;
        }
    }

    state.last_card_date = Some(now);

    if state.cards_studied_today >= DAILY_STREAK_GOAL && !state.streak_updated_today {
        update_streak_day(state, now, offset_minutes);
        state.streak_updated_today = true;
    }
}

/// Count `now`'s local day toward the streak.
///
/// Consecutive day extends the streak (and the high-water mark), a gap of
/// more than one day breaks it back to 1, the same day is a no-op. The
/// high-water mark `longest_streak` is never lowered.
fn update_streak_day(state: &mut StreakState, now: DateTime<Utc>, offset_minutes: i32) {
    let today = local_day(now, offset_minutes);

    match state.last_study_date {
        None => {
            state.current_streak = 1;
            state.longest_streak = state.longest_streak.max(1);
        }
        Some(last) => {
            let diff_days = (today - local_day(last, offset_minutes)).num_days();
            if diff_days == 1 {
                state.current_streak += 1;
                state.longest_streak = state.longest_streak.max(state.current_streak);
            } else if diff_days > 1 {
                state.current_streak = 1;
            }
            // diff_days == 0: already counted today
        }
    }

    state.last_study_date = Some(now);
}

/// The streak value a reader should see right now.
///
/// A stored streak silently lapses once more than one UTC calendar day has
/// passed since the last qualifying day; recomputing here keeps leaderboard
/// order and champion eligibility honest without a write.
///
/// Rank queries apply the same rule in SQL (`RANK_ORDER` in the repository
/// layer); keep the two in lockstep.
pub fn effective_streak(
    current_streak: i32,
    last_study_date: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> i32 {
    match last_study_date {
        Some(last) if (now.date_naive() - last.date_naive()).num_days() <= 1 => current_streak,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    #[test]
    fn test_first_card_of_day_resets_counter() {
        let mut state = StreakState {
            cards_studied_today: 9,
            streak_updated_today: true,
            last_card_date: Some(at(2025, 3, 1, 20, 0)),
            ..Default::default()
        };
        track_card_studied(&mut state, at(2025, 3, 2, 8, 0), 0);
        assert_eq!(state.cards_studied_today, 1);
        assert!(!state.streak_updated_today);
        assert_eq!(state.last_card_date, Some(at(2025, 3, 2, 8, 0)));
    }

    #[test]
    fn test_goal_activates_streak_exactly_once() {
        let mut state = StreakState::default();
        let now = at(2025, 3, 1, 12, 0);
        for _ in 0..DAILY_STREAK_GOAL {
            track_card_studied(&mut state, now, 0);
        }
        assert_eq!(state.cards_studied_today, 10);
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 1);
        assert!(state.streak_updated_today);

        // An 11th card the same day must not re-increment
        track_card_studied(&mut state, now, 0);
        assert_eq!(state.cards_studied_today, 11);
        assert_eq!(state.current_streak, 1);
    }

    #[test]
    fn test_below_goal_does_not_touch_streak() {
        let mut state = StreakState::default();
        for _ in 0..(DAILY_STREAK_GOAL - 1) {
            track_card_studied(&mut state, at(2025, 3, 1, 12, 0), 0);
        }
        assert_eq!(state.current_streak, 0);
        assert!(state.last_study_date.is_none());
    }

    #[test]
    fn test_consecutive_day_extends_streak() {
        let mut state = StreakState::default();
        for day in 1..=3 {
            let now = at(2025, 3, day, 12, 0);
            for _ in 0..DAILY_STREAK_GOAL {
                track_card_studied(&mut state, now, 0);
            }
        }
        assert_eq!(state.current_streak, 3);
        assert_eq!(state.longest_streak, 3);
    }

    #[test]
    fn test_gap_breaks_streak_but_keeps_longest() {
        let mut state = StreakState::default();
        for day in [1, 2, 3] {
            let now = at(2025, 3, day, 12, 0);
            for _ in 0..DAILY_STREAK_GOAL {
                track_card_studied(&mut state, now, 0);
            }
        }
        // Three days of silence, then the goal is reached again
        let now = at(2025, 3, 7, 12, 0);
        for _ in 0..DAILY_STREAK_GOAL {
            track_card_studied(&mut state, now, 0);
        }
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 3);
    }

    #[test]
    fn test_offset_shifts_the_day_boundary() {
        // 01:00 UTC with a +120 minute offset (west of UTC) is still the
        // previous local day, so both cards land on the same local day.
        let mut state = StreakState::default();
        track_card_studied(&mut state, at(2025, 3, 1, 23, 0), 120);
        track_card_studied(&mut state, at(2025, 3, 2, 1, 0), 120);
        assert_eq!(state.cards_studied_today, 2);

        // Under UTC the second card is a new day
        let mut state = StreakState::default();
        track_card_studied(&mut state, at(2025, 3, 1, 23, 0), 0);
        track_card_studied(&mut state, at(2025, 3, 2, 1, 0), 0);
        assert_eq!(state.cards_studied_today, 1);
    }

    #[test]
    fn test_effective_streak_stands_within_a_day() {
        let now = at(2025, 3, 2, 12, 0);
        assert_eq!(effective_streak(5, Some(at(2025, 3, 2, 1, 0)), now), 5);
        assert_eq!(effective_streak(5, Some(at(2025, 3, 1, 23, 0)), now), 5);
    }

    #[test]
    fn test_effective_streak_decays_after_a_missed_day() {
        let now = at(2025, 3, 4, 12, 0);
        assert_eq!(effective_streak(5, Some(at(2025, 3, 2, 23, 0)), now), 0);
        assert_eq!(effective_streak(5, None, now), 0);
    }

    #[test]
    fn test_longest_streak_is_monotonic() {
        let mut state = StreakState {
            current_streak: 1,
            longest_streak: 7,
            last_study_date: Some(at(2025, 3, 1, 12, 0)),
            ..Default::default()
        };
        let now = at(2025, 3, 2, 12, 0);
        for _ in 0..DAILY_STREAK_GOAL {
            track_card_studied(&mut state, now, 0);
        }
        assert_eq!(state.current_streak, 2);
        assert_eq!(state.longest_streak, 7);
    }
}
