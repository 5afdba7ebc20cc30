// SPDX-License-Identifier: MIT
//! Experience points and level. [`compute_xp`] is the single authoritative
//! place XP is computed — no other component awards XP.

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::model::{Difficulty, QuizMode, XpUpdate};
use crate::profile;
use crate::storage::{keys, Storage};

/// XP needed per level.
const XP_PER_LEVEL: u64 = 100;
/// Flat bonus for a perfect quiz.
const PERFECT_BONUS: f64 = 20.0;
/// Flat bonus for averaging under [`SPEED_SECS_PER_QUESTION`] per question.
const SPEED_BONUS: f64 = 5.0;
const SPEED_SECS_PER_QUESTION: f64 = 15.0;
/// Test mode pays 20% more than practice.
const TEST_MULTIPLIER: f64 = 1.2;
/// Streak multiplier cap.
const MAX_STREAK_MULTIPLIER: f64 = 2.0;

pub fn level_for_xp(xp: u64) -> u32 {
    (xp / XP_PER_LEVEL) as u32 + 1
}

pub fn level_progress(xp: u64) -> u64 {
    xp % XP_PER_LEVEL
}

/// Compute the XP earned by one quiz. Steps apply in a fixed order: base,
/// difficulty multiplier, test multiplier, perfect bonus, speed bonus,
/// streak multiplier, then one final round-to-nearest.
pub fn compute_xp(
    correct: u32,
    total: u32,
    time_spent_secs: u64,
    mode: QuizMode,
    difficulty: Difficulty,
    streak: u32,
) -> u64 {
    let mut xp = correct as f64 * 10.0;
    xp *= difficulty.xp_multiplier();
    if mode.is_test() {
        xp *= TEST_MULTIPLIER;
    }
    if total > 0 && correct == total {
        xp += PERFECT_BONUS;
    }
    if correct > 0 && total > 0 {
        let secs_per_question = time_spent_secs as f64 / total as f64;
        if secs_per_question < SPEED_SECS_PER_QUESTION {
            xp += SPEED_BONUS;
        }
    }
    if streak > 3 {
        let multiplier = (1.0 + (streak - 3) as f64 * 0.1).min(MAX_STREAK_MULTIPLIER);
        xp *= multiplier;
    }
    xp.round() as u64
}

/// Apply one quiz's XP gain to the profile and recompute the level.
pub async fn update_user_xp(
    storage: &Storage,
    correct: u32,
    total: u32,
    time_spent_secs: u64,
    mode: QuizMode,
    difficulty: Difficulty,
    streak: u32,
    now: DateTime<Utc>,
) -> Result<XpUpdate> {
    let _guard = storage.lock_key(keys::USER_PROFILE).await;
    let mut p = profile::load_or_init(storage, now).await?;

    let old_xp = p.stats.xp;
    let old_level = p.level;
    let xp_gained = compute_xp(correct, total, time_spent_secs, mode, difficulty, streak);
    let new_xp = old_xp + xp_gained;
    let new_level = level_for_xp(new_xp);

    p.stats.xp = new_xp;
    p.level = new_level;
    p.level_progress = level_progress(new_xp);
    profile::save(storage, &p).await?;

    Ok(XpUpdate {
        old_xp,
        new_xp,
        xp_gained,
        old_level,
        new_level,
        leveled_up: new_level > old_level,
    })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_practice_quiz_with_speed_bonus() {
        // 5×10 base, medium ×1.0, +20 perfect, +5 speed (12 s/question).
        assert_eq!(
            compute_xp(5, 5, 60, QuizMode::Practice, Difficulty::Medium, 0),
            75
        );
    }

    #[test]
    fn perfect_practice_quiz_without_speed_bonus() {
        // 80 s / 5 questions = 16 s/question: over the speed threshold.
        assert_eq!(
            compute_xp(5, 5, 80, QuizMode::Practice, Difficulty::Medium, 0),
            70
        );
    }

    #[test]
    fn difficulty_scales_the_base_before_bonuses() {
        // 3×10 ×0.8 = 24, no perfect, no speed (90 s / 5 = 18 s/question).
        assert_eq!(
            compute_xp(3, 5, 90, QuizMode::Practice, Difficulty::Easy, 0),
            24
        );
        // 3×10 ×1.5 = 45.
        assert_eq!(
            compute_xp(3, 5, 90, QuizMode::Practice, Difficulty::Hard, 0),
            45
        );
    }

    #[test]
    fn test_mode_multiplier_applies_before_flat_bonuses() {
        // 4×10 ×1.2 = 48, no perfect, no speed (100 s / 5 = 20 s/question).
        assert_eq!(
            compute_xp(4, 5, 100, QuizMode::Test, Difficulty::Medium, 0),
            48
        );
        // Perfect test: 5×10 ×1.2 = 60, +20 = 80 (no speed at 16 s/question).
        assert_eq!(
            compute_xp(5, 5, 80, QuizMode::Test, Difficulty::Medium, 0),
            80
        );
    }

    #[test]
    fn streak_multiplier_kicks_in_above_three_and_caps_at_two() {
        let base = compute_xp(5, 5, 80, QuizMode::Practice, Difficulty::Medium, 0);
        assert_eq!(base, 70);
        // Streak 3 is not yet a bonus.
        assert_eq!(
            compute_xp(5, 5, 80, QuizMode::Practice, Difficulty::Medium, 3),
            70
        );
        // Streak 5 → ×1.2.
        assert_eq!(
            compute_xp(5, 5, 80, QuizMode::Practice, Difficulty::Medium, 5),
            84
        );
        // Streak 30 would be ×3.7 uncapped; capped at ×2.
        assert_eq!(
            compute_xp(5, 5, 80, QuizMode::Practice, Difficulty::Medium, 30),
            140
        );
    }

    #[test]
    fn zero_correct_earns_nothing_extra() {
        assert_eq!(
            compute_xp(0, 5, 10, QuizMode::Practice, Difficulty::Medium, 10),
            0
        );
    }

    #[test]
    fn level_boundaries() {
        assert_eq!(level_for_xp(0), 1);
        assert_eq!(level_for_xp(99), 1);
        assert_eq!(level_for_xp(100), 2);
        assert_eq!(level_for_xp(250), 3);
        assert_eq!(level_progress(250), 50);
    }
}
