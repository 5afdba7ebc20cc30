// SPDX-License-Identifier: MIT
//! The award catalogue — every award the engine can grant, with stable
//! snake_case string ids.
//!
//! Ids are persisted inside the user profile and must never change across
//! versions. Awards added in later versions are merged into existing
//! profiles on load via [`merge_missing`].

use crate::model::UserAward;

// ─── One-shot awards for a single quiz ───────────────────────────────────────

pub const FIRST_QUIZ: &str = "first_quiz";
pub const PERFECT_SCORE: &str = "perfect_score";
pub const FLAWLESS_TEST: &str = "flawless_test";
pub const GIANT_SLAYER: &str = "giant_slayer";
pub const SPEED_RUN: &str = "speed_run";
pub const TEST_ACE: &str = "test_ace";
pub const EARLY_BIRD: &str = "early_bird";
pub const NIGHT_OWL: &str = "night_owl";
pub const WEEKEND_WARRIOR: &str = "weekend_warrior";
pub const COMEBACK: &str = "comeback";
pub const MARATHON: &str = "marathon";
pub const NO_SKIPS: &str = "no_skips";

// ─── Cumulative-stat thresholds ──────────────────────────────────────────────

pub const QUIZZES_10: &str = "quizzes_10";
pub const QUIZZES_50: &str = "quizzes_50";
pub const QUIZZES_100: &str = "quizzes_100";
pub const QUIZZES_250: &str = "quizzes_250";
pub const QUIZZES_500: &str = "quizzes_500";

pub const CORRECT_100: &str = "correct_100";
pub const CORRECT_500: &str = "correct_500";
pub const CORRECT_1000: &str = "correct_1000";
pub const CORRECT_5000: &str = "correct_5000";

pub const XP_500: &str = "xp_500";
pub const XP_1000: &str = "xp_1000";
pub const XP_5000: &str = "xp_5000";
pub const XP_10000: &str = "xp_10000";

pub const LEVEL_5: &str = "level_5";
pub const LEVEL_10: &str = "level_10";
pub const LEVEL_25: &str = "level_25";
pub const LEVEL_50: &str = "level_50";

pub const HOURS_1: &str = "hours_1";
pub const HOURS_10: &str = "hours_10";
pub const HOURS_50: &str = "hours_50";
pub const HOURS_100: &str = "hours_100";

pub const EXPLORER_3: &str = "explorer_3";
pub const EXPLORER_5: &str = "explorer_5";
pub const EXPLORER_10: &str = "explorer_10";

pub const SHARP_SHOOTER: &str = "sharp_shooter";
pub const PRECISION_MASTER: &str = "precision_master";
pub const ALL_ROUNDER: &str = "all_rounder";

// ─── Bounded progress counters ───────────────────────────────────────────────

pub const PERFECTIONIST_5: &str = "perfectionist_5";
pub const PERFECTIONIST_25: &str = "perfectionist_25";
pub const PRACTICE_25: &str = "practice_25";
pub const PRACTICE_100: &str = "practice_100";
pub const TEST_25: &str = "test_25";
pub const TEST_100: &str = "test_100";
pub const LIGHTNING_50: &str = "lightning_50";
pub const LIGHTNING_250: &str = "lightning_250";
pub const DAILY_5: &str = "daily_5";
pub const DAILY_10: &str = "daily_10";
pub const BIG_DAY: &str = "big_day";
pub const WEEKLY_10: &str = "weekly_10";
pub const QUESTIONS_500: &str = "questions_500";
pub const QUESTIONS_2000: &str = "questions_2000";
pub const ACTIVE_DAYS_7: &str = "active_days_7";
pub const ACTIVE_DAYS_30: &str = "active_days_30";

// ─── Streak awards (progress mirrors the current streak) ─────────────────────

pub const STREAK_3: &str = "streak_3";
pub const STREAK_7: &str = "streak_7";
pub const STREAK_14: &str = "streak_14";
pub const STREAK_30: &str = "streak_30";
pub const STREAK_60: &str = "streak_60";
pub const STREAK_100: &str = "streak_100";

/// Static definition of one award.
#[derive(Debug, Clone, Copy)]
pub struct AwardDef {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    /// `Some` for awards that accumulate toward a threshold.
    pub max_progress: Option<u64>,
}

const fn oneshot(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
) -> AwardDef {
    AwardDef {
        id,
        name,
        description,
        icon,
        max_progress: None,
    }
}

const fn counter(
    id: &'static str,
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    max: u64,
) -> AwardDef {
    AwardDef {
        id,
        name,
        description,
        icon,
        max_progress: Some(max),
    }
}

/// The canonical award catalogue. Order here is the display order.
pub fn all_definitions() -> Vec<AwardDef> {
    vec![
        oneshot(FIRST_QUIZ, "First Steps", "Completed your first quiz.", "🎯"),
        oneshot(
            PERFECT_SCORE,
            "Perfect Score",
            "Scored 100% on a quiz with at least 5 questions.",
            "🏆",
        ),
        oneshot(
            FLAWLESS_TEST,
            "Flawless Test",
            "Scored 100% on a test with at least 5 questions.",
            "💎",
        ),
        oneshot(
            GIANT_SLAYER,
            "Giant Slayer",
            "Scored 100% on a hard quiz with at least 5 questions.",
            "🗿",
        ),
        oneshot(
            SPEED_RUN,
            "Speed Run",
            "Finished 5 or more questions in under 2 minutes with at least 70% correct.",
            "⚡",
        ),
        oneshot(
            TEST_ACE,
            "Test Ace",
            "Scored over 90% on a test with at least 10 questions.",
            "🎓",
        ),
        oneshot(EARLY_BIRD, "Early Bird", "Completed a quiz before 8 in the morning.", "🌅"),
        oneshot(NIGHT_OWL, "Night Owl", "Completed a quiz after 10 at night.", "🦉"),
        oneshot(WEEKEND_WARRIOR, "Weekend Warrior", "Completed a quiz on a weekend.", "🏖️"),
        oneshot(COMEBACK, "Comeback", "Came back to studying after missing a day or more.", "💪"),
        oneshot(MARATHON, "Marathon", "Completed a quiz with 20 or more questions.", "🏃"),
        oneshot(
            NO_SKIPS,
            "No Stone Unturned",
            "Answered every question in a quiz of 10 or more, no skips.",
            "🧗",
        ),
        oneshot(QUIZZES_10, "Getting Warmed Up", "Completed 10 quizzes.", "🔥"),
        oneshot(QUIZZES_50, "Half Century", "Completed 50 quizzes.", "🥉"),
        oneshot(QUIZZES_100, "Century", "Completed 100 quizzes.", "🥈"),
        oneshot(QUIZZES_250, "Dedicated Scholar", "Completed 250 quizzes.", "🥇"),
        oneshot(QUIZZES_500, "Quiz Legend", "Completed 500 quizzes.", "👑"),
        oneshot(CORRECT_100, "Hundred Club", "Answered 100 questions correctly.", "✅"),
        oneshot(CORRECT_500, "Five Hundred Club", "Answered 500 questions correctly.", "🌟"),
        oneshot(CORRECT_1000, "Thousand Club", "Answered 1,000 questions correctly.", "💫"),
        oneshot(CORRECT_5000, "Oracle", "Answered 5,000 questions correctly.", "🔮"),
        oneshot(XP_500, "Rising Star", "Earned 500 XP.", "⭐"),
        oneshot(XP_1000, "Shooting Star", "Earned 1,000 XP.", "🌠"),
        oneshot(XP_5000, "Supernova", "Earned 5,000 XP.", "☀️"),
        oneshot(XP_10000, "Galaxy Brain", "Earned 10,000 XP.", "🌌"),
        oneshot(LEVEL_5, "Apprentice", "Reached level 5.", "🛡️"),
        oneshot(LEVEL_10, "Adept", "Reached level 10.", "⚔️"),
        oneshot(LEVEL_25, "Expert", "Reached level 25.", "🏅"),
        oneshot(LEVEL_50, "Grandmaster", "Reached level 50.", "🏰"),
        oneshot(HOURS_1, "First Hour", "Studied for a total of 1 hour.", "⏳"),
        oneshot(HOURS_10, "Ten Hours In", "Studied for a total of 10 hours.", "⏰"),
        oneshot(HOURS_50, "Fifty Hours Deep", "Studied for a total of 50 hours.", "🕰️"),
        oneshot(HOURS_100, "Hundred-Hour Scholar", "Studied for a total of 100 hours.", "📚"),
        oneshot(EXPLORER_3, "Curious", "Studied 3 different subjects.", "🧭"),
        oneshot(EXPLORER_5, "Explorer", "Studied 5 different subjects.", "🗺️"),
        oneshot(EXPLORER_10, "Polymath", "Studied 10 different subjects.", "🌍"),
        oneshot(
            SHARP_SHOOTER,
            "Sharp Shooter",
            "Held 80% overall accuracy across 20 or more quizzes.",
            "🎪",
        ),
        oneshot(
            PRECISION_MASTER,
            "Precision Master",
            "Held 90% overall accuracy across 50 or more quizzes.",
            "🔬",
        ),
        oneshot(
            ALL_ROUNDER,
            "All-Rounder",
            "Completed 10 practice quizzes and 10 tests.",
            "⚖️",
        ),
        counter(
            PERFECTIONIST_5,
            "Perfectionist",
            "Score 100% on 5 quizzes of 5 or more questions.",
            "🎖️",
            5,
        ),
        counter(
            PERFECTIONIST_25,
            "Obsessive Perfectionist",
            "Score 100% on 25 quizzes of 5 or more questions.",
            "💯",
            25,
        ),
        counter(PRACTICE_25, "Practice Makes Perfect", "Complete 25 practice quizzes.", "📝", 25),
        counter(PRACTICE_100, "Drill Sergeant", "Complete 100 practice quizzes.", "🪖", 100),
        counter(TEST_25, "Test Taker", "Complete 25 tests.", "🧪", 25),
        counter(TEST_100, "Examiner's Nightmare", "Complete 100 tests.", "📋", 100),
        counter(
            LIGHTNING_50,
            "Lightning Reflexes",
            "Answer 50 questions correctly in under 5 seconds each.",
            "🌩️",
            50,
        ),
        counter(
            LIGHTNING_250,
            "Storm Front",
            "Answer 250 questions correctly in under 5 seconds each.",
            "⛈️",
            250,
        ),
        counter(DAILY_5, "Daily Five", "Complete 5 quizzes in a single day.", "📆", 5),
        counter(DAILY_10, "Day Grinder", "Complete 10 quizzes in a single day.", "🗓️", 10),
        counter(BIG_DAY, "Big Day", "Answer 50 questions in a single day.", "🌞", 50),
        counter(WEEKLY_10, "Weekly Ten", "Complete 10 quizzes in a single week.", "📅", 10),
        counter(QUESTIONS_500, "Question Hunter", "Answer 500 questions.", "🏹", 500),
        counter(QUESTIONS_2000, "Question Slayer", "Answer 2,000 questions.", "🗡️", 2000),
        counter(ACTIVE_DAYS_7, "Seven Days", "Study on 7 different days.", "🌱", 7),
        counter(ACTIVE_DAYS_30, "Thirty Days", "Study on 30 different days.", "🌳", 30),
        counter(STREAK_3, "On a Roll", "Study 3 days in a row.", "🔥", 3),
        counter(STREAK_7, "Week Streak", "Study 7 days in a row.", "🔥", 7),
        counter(STREAK_14, "Fortnight Focus", "Study 14 days in a row.", "🔥", 14),
        counter(STREAK_30, "Monthly Devotion", "Study 30 days in a row.", "🔥", 30),
        counter(STREAK_60, "Unstoppable", "Study 60 days in a row.", "🔥", 60),
        counter(STREAK_100, "Eternal Flame", "Study 100 days in a row.", "🔥", 100),
    ]
}

/// Ids whose progress mirrors the current streak value and may fall when the
/// streak breaks. Every other award's progress is monotonic.
pub const STREAK_AWARDS: [&str; 6] = [
    STREAK_3, STREAK_7, STREAK_14, STREAK_30, STREAK_60, STREAK_100,
];

impl AwardDef {
    fn to_award(self) -> UserAward {
        UserAward {
            id: self.id.to_string(),
            name: self.name.to_string(),
            description: self.description.to_string(),
            icon: self.icon.to_string(),
            unlocked: false,
            unlocked_at: None,
            progress: self.max_progress.map(|_| 0),
            max_progress: self.max_progress,
        }
    }
}

/// Locked awards for a fresh profile.
pub fn seed_awards() -> Vec<UserAward> {
    all_definitions().into_iter().map(AwardDef::to_award).collect()
}

/// Append catalogue entries missing from `awards` (profiles persisted before
/// the catalogue grew). Existing entries are left untouched. Returns whether
/// anything was added.
pub fn merge_missing(awards: &mut Vec<UserAward>) -> bool {
    let mut added = false;
    for def in all_definitions() {
        if !awards.iter().any(|a| a.id == def.id) {
            awards.push(def.to_award());
            added = true;
        }
    }
    added
}

// ─── Tests ────────────────────────────────────────────────────────────────────
