// SPDX-License-Identifier: MIT
//! Achievement engine — evaluates every award rule against the current stats
//! and the just-completed quiz, mutating the profile's award list.
//!
//! Unlocks are monotonic: an unlocked award is never re-locked and its
//! `unlocked_at` never changes. Progress only increases, with one exception:
//! the streak awards mirror the current streak value, which falls when the
//! streak breaks. Callers invoke this exactly once per completed quiz;
//! calling twice double-counts the bounded progress rules.

pub mod catalog;

use anyhow::Result;
use chrono::{DateTime, Datelike, Timelike, Utc, Weekday};

use crate::model::{DailyStats, Difficulty, QuizMode, UserAward};
use crate::profile;
use crate::storage::{keys, Storage};

use catalog::*;

/// Everything one rule evaluation can see about the just-completed quiz.
#[derive(Debug, Clone)]
pub struct AttemptContext {
    pub correct: u32,
    pub total: u32,
    /// Percentage score, 0–100, as computed by the processor.
    pub score: f64,
    pub time_spent_secs: u64,
    pub mode: QuizMode,
    pub difficulty: Difficulty,
    /// Questions skipped or left unanswered in this quiz.
    pub skipped: u32,
    /// Correct answers given in under 5 seconds in this quiz.
    pub lightning_correct: u32,
    /// Streak value after this quiz's streak update.
    pub streak: u32,
    /// The streak length that was lost when this quiz reset a broken streak.
    pub streak_reset_from: Option<u32>,
    pub now: DateTime<Utc>,
}

/// Evaluate all rules, persist the mutated award list, and return the awards
/// newly unlocked by this call.
///
/// Runs after the stats/streak/XP stages so the cumulative counters it reads
/// already include this quiz.
pub async fn check_achievements(storage: &Storage, ctx: &AttemptContext) -> Result<Vec<UserAward>> {
    // Reads of other keys happen outside the profile lock.
    let subjects_explored = storage.count_prefix(keys::SUBJECT_ANALYTICS_PREFIX).await?;
    let active_days = storage.count_prefix(keys::DAILY_STATS_PREFIX).await?;
    let today_key = keys::daily_stats(&ctx.now.format("%Y-%m-%d").to_string());
    let today = storage.get_json::<DailyStats>(&today_key).await?;

    let _guard = storage.lock_key(keys::USER_PROFILE).await;
    let mut p = profile::load_or_init(storage, ctx.now).await?;

    let mut eval = Evaluator {
        awards: &mut p.awards,
        now: ctx.now,
        newly: Vec::new(),
    };

    let stats = &p.stats;
    let perfect = ctx.total >= 5 && ctx.correct == ctx.total;

    // One-shot conditions on this quiz.
    eval.unlock_if(stats.total_quizzes >= 1, FIRST_QUIZ);
    eval.unlock_if(perfect, PERFECT_SCORE);
    eval.unlock_if(perfect && ctx.mode.is_test(), FLAWLESS_TEST);
    eval.unlock_if(perfect && ctx.difficulty == Difficulty::Hard, GIANT_SLAYER);
    eval.unlock_if(
        ctx.total >= 5 && ctx.time_spent_secs < 120 && ctx.score >= 70.0,
        SPEED_RUN,
    );
    eval.unlock_if(
        ctx.mode.is_test() && ctx.score > 90.0 && ctx.total >= 10,
        TEST_ACE,
    );
    eval.unlock_if(ctx.now.hour() < 8, EARLY_BIRD);
    eval.unlock_if(ctx.now.hour() >= 22, NIGHT_OWL);
    eval.unlock_if(
        matches!(ctx.now.weekday(), Weekday::Sat | Weekday::Sun),
        WEEKEND_WARRIOR,
    );
    eval.unlock_if(ctx.streak_reset_from.is_some(), COMEBACK);
    eval.unlock_if(ctx.total >= 20, MARATHON);
    eval.unlock_if(ctx.total >= 10 && ctx.skipped == 0, NO_SKIPS);

    // Cumulative-stat thresholds.
    for (threshold, id) in [
        (10, QUIZZES_10),
        (50, QUIZZES_50),
        (100, QUIZZES_100),
        (250, QUIZZES_250),
        (500, QUIZZES_500),
    ] {
        eval.unlock_if(stats.total_quizzes >= threshold, id);
    }
    for (threshold, id) in [
        (100, CORRECT_100),
        (500, CORRECT_500),
        (1_000, CORRECT_1000),
        (5_000, CORRECT_5000),
    ] {
        eval.unlock_if(stats.correct_answers >= threshold, id);
    }
    for (threshold, id) in [
        (500, XP_500),
        (1_000, XP_1000),
        (5_000, XP_5000),
        (10_000, XP_10000),
    ] {
        eval.unlock_if(stats.xp >= threshold, id);
    }
    for (threshold, id) in [(5, LEVEL_5), (10, LEVEL_10), (25, LEVEL_25), (50, LEVEL_50)] {
        eval.unlock_if(p.level >= threshold, id);
    }
    let hours = stats.total_time_hours();
    for (threshold, id) in [
        (1.0, HOURS_1),
        (10.0, HOURS_10),
        (50.0, HOURS_50),
        (100.0, HOURS_100),
    ] {
        eval.unlock_if(hours >= threshold, id);
    }
    for (threshold, id) in [(3, EXPLORER_3), (5, EXPLORER_5), (10, EXPLORER_10)] {
        eval.unlock_if(subjects_explored >= threshold, id);
    }
    eval.unlock_if(
        stats.total_quizzes >= 20 && stats.overall_accuracy >= 80.0,
        SHARP_SHOOTER,
    );
    eval.unlock_if(
        stats.total_quizzes >= 50 && stats.overall_accuracy >= 90.0,
        PRECISION_MASTER,
    );
    eval.unlock_if(
        stats.practice_quizzes >= 10 && stats.test_quizzes >= 10,
        ALL_ROUNDER,
    );

    // Counters bumped once per quiz.
    if perfect {
        eval.bump(PERFECTIONIST_5, 1);
        eval.bump(PERFECTIONIST_25, 1);
    }
    if ctx.lightning_correct > 0 {
        eval.bump(LIGHTNING_50, ctx.lightning_correct as u64);
        eval.bump(LIGHTNING_250, ctx.lightning_correct as u64);
    }

    // Counters mirroring cumulative stats; `raise_to` keeps them monotonic
    // even for values that can fall (best day, current week).
    eval.raise_to(PRACTICE_25, stats.practice_quizzes);
    eval.raise_to(PRACTICE_100, stats.practice_quizzes);
    eval.raise_to(TEST_25, stats.test_quizzes);
    eval.raise_to(TEST_100, stats.test_quizzes);
    eval.raise_to(QUESTIONS_500, stats.total_questions);
    eval.raise_to(QUESTIONS_2000, stats.total_questions);
    eval.raise_to(WEEKLY_10, stats.weekly_quizzes);
    eval.raise_to(ACTIVE_DAYS_7, active_days);
    eval.raise_to(ACTIVE_DAYS_30, active_days);
    if let Some(today) = &today {
        eval.raise_to(DAILY_5, today.quizzes);
        eval.raise_to(DAILY_10, today.quizzes);
        eval.raise_to(BIG_DAY, today.questions);
    }

    // Streak awards track the current value; unlocked state stays monotonic.
    for id in STREAK_AWARDS {
        eval.track_streak(id, ctx.streak);
    }

    let newly = eval.newly;
    profile::save(storage, &p).await?;
    Ok(newly)
}

/// Mutation helpers over the award list, enforcing the monotonicity rules
/// and collecting newly unlocked awards.
struct Evaluator<'a> {
    awards: &'a mut Vec<UserAward>,
    now: DateTime<Utc>,
    newly: Vec<UserAward>,
}

impl Evaluator<'_> {
    fn award_mut(&mut self, id: &str) -> Option<&mut UserAward> {
        self.awards.iter_mut().find(|a| a.id == id)
    }

    fn unlock_if(&mut self, condition: bool, id: &str) {
        if condition {
            self.unlock(id);
        }
    }

    fn unlock(&mut self, id: &str) {
        let now = self.now;
        let Some(award) = self.award_mut(id) else {
            return;
        };
        if award.unlocked {
            return;
        }
        award.unlocked = true;
        award.unlocked_at = Some(now);
        if let Some(max) = award.max_progress {
            award.progress = Some(max);
        }
        let unlocked = award.clone();
        self.newly.push(unlocked);
    }

    /// Add `delta` to a bounded counter, unlocking at the threshold.
    /// Already-unlocked counters are left alone.
    fn bump(&mut self, id: &str, delta: u64) {
        let Some(award) = self.award_mut(id) else {
            return;
        };
        if award.unlocked {
            return;
        }
        let Some(max) = award.max_progress else {
            return;
        };
        let progress = (award.progress.unwrap_or(0) + delta).min(max);
        award.progress = Some(progress);
        if progress >= max {
            self.unlock(id);
        }
    }

    /// Raise a bounded counter to `value` if that is higher than its current
    /// progress; never lowers it.
    fn raise_to(&mut self, id: &str, value: u64) {
        let Some(award) = self.award_mut(id) else {
            return;
        };
        if award.unlocked {
            return;
        }
        let Some(max) = award.max_progress else {
            return;
        };
        let progress = award.progress.unwrap_or(0).max(value.min(max));
        award.progress = Some(progress);
        if progress >= max {
            self.unlock(id);
        }
    }

    /// Streak awards: progress follows the current streak, up and down.
    fn track_streak(&mut self, id: &str, streak: u32) {
        let Some(award) = self.award_mut(id) else {
            return;
        };
        let Some(max) = award.max_progress else {
            return;
        };
        award.progress = Some((streak as u64).min(max));
        if streak as u64 >= max {
            self.unlock(id);
        }
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
