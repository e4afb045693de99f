//! The achievement registry.
//!
//! An immutable table of achievement ids mapped to pure threshold predicates
//! over the user's stats aggregate. Unlocks are append-only: once an id is in
//! a user's unlock set it never leaves, regardless of later stat snapshots.
//!
//! Two ids deliberately live outside the predicate table's reach:
//! [`NEWCOMER`] has a permanently-false predicate and is only granted by the
//! explicit claim endpoint, and [`CHAMPION`] is not in the table at all
//! because deciding it takes a cross-user rank query (see `jobs`).
//!
//! Special badges are a disjoint, admin-granted mechanism; nothing in this
//! module reads or writes them beyond exposing the static badge catalog.

use serde::Serialize;

use qz_db::models::UserStats;

/// Claim-only achievement; its predicate never fires.
pub const NEWCOMER: &str = "newcomer";

/// Top-leaderboard achievement, granted by the background rank check.
pub const CHAMPION: &str = "champion";

/// One auto-unlockable achievement rule.
#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    #[serde(skip)]
    check: fn(&UserStats) -> bool,
}

impl Achievement {
    pub fn is_satisfied_by(&self, stats: &UserStats) -> bool {
        (self.check)(stats)
    }
}

/// An admin-granted badge definition.
#[derive(Debug, Clone, Serialize)]
pub struct SpecialBadge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

/// The static rule table. Thresholds only ever compare monotonic counters,
/// so a rule that fired once stays true for every later snapshot.
pub static ACHIEVEMENTS: &[Achievement] = &[
    Achievement {
        id: NEWCOMER,
        name: "Newcomer",
        description: "Complete the newcomer quest",
        icon: "🚀",
        check: |_| false, // claim-only, see `stats::claim_quest`
    },
    Achievement {
        id: "first_card",
        name: "First Steps",
        description: "Study your first card",
        icon: "🎯",
        check: |s| s.total_cards_studied >= 1,
    },
    Achievement {
        id: "cards_10",
        name: "Getting Started",
        description: "Study 10 cards",
        icon: "📚",
        check: |s| s.total_cards_studied >= 10,
    },
    Achievement {
        id: "cards_50",
        name: "Card Collector",
        description: "Study 50 cards",
        icon: "🃏",
        check: |s| s.total_cards_studied >= 50,
    },
    Achievement {
        id: "cards_100",
        name: "Card Master",
        description: "Study 100 cards",
        icon: "👑",
        check: |s| s.total_cards_studied >= 100,
    },
    Achievement {
        id: "cards_500",
        name: "Card Legend",
        description: "Study 500 cards",
        icon: "🏆",
        check: |s| s.total_cards_studied >= 500,
    },
    Achievement {
        id: "streak_3",
        name: "On Fire",
        description: "Study 3 days in a row",
        icon: "🔥",
        check: |s| s.longest_streak >= 3,
    },
    Achievement {
        id: "streak_7",
        name: "Week Warrior",
        description: "Study 7 days in a row",
        icon: "⚔️",
        check: |s| s.longest_streak >= 7,
    },
    Achievement {
        id: "streak_30",
        name: "Dedicated Learner",
        description: "Study 30 days in a row",
        icon: "💎",
        check: |s| s.longest_streak >= 30,
    },
    Achievement {
        id: "quiz_first",
        name: "Quiz Taker",
        description: "Finish your first quiz",
        icon: "✏️",
        check: |s| s.total_quizzes_taken >= 1,
    },
    Achievement {
        id: "quiz_10",
        name: "Quiz Master",
        description: "Finish 10 quizzes",
        icon: "🎓",
        check: |s| s.total_quizzes_taken >= 10,
    },
];

/// Admin-grantable badges. Kept next to the achievements for discoverability
/// but never evaluated automatically.
pub static SPECIAL_BADGES: &[SpecialBadge] = &[
    SpecialBadge {
        id: "founder",
        name: "Founder",
        description: "Founded QuizDeck",
        icon: "⭐",
    },
    SpecialBadge {
        id: "beta_tester",
        name: "Beta Tester",
        description: "Tested the earliest builds",
        icon: "🧪",
    },
    SpecialBadge {
        id: "contributor",
        name: "Contributor",
        description: "Contributed to the project",
        icon: "💝",
    },
];

pub fn find(id: &str) -> Option<&'static Achievement> {
    ACHIEVEMENTS.iter().find(|a| a.id == id)
}

pub fn find_badge(id: &str) -> Option<&'static SpecialBadge> {
    SPECIAL_BADGES.iter().find(|b| b.id == id)
}

/// Evaluate every rule not already unlocked against `stats` and return the
/// newly-satisfied descriptors. Pure; persisting the unlocks is the caller's
/// job so it can happen in the same transaction as the stats write.
pub fn check_achievements(unlocked: &[String], stats: &UserStats) -> Vec<&'static Achievement> {
    ACHIEVEMENTS
        .iter()
        .filter(|a| !unlocked.iter().any(|id| id == a.id) && a.is_satisfied_by(stats))
        .collect()
}
