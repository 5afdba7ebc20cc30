// SPDX-License-Identifier: MIT
//! The result processor — turns a raw attempt list into a persisted
//! [`ProcessedQuizResult`] and drives every derived-state engine.
//!
//! Stage order within one submission: history → aggregate analytics →
//! cumulative user stats → streak → XP → achievements → bus notification.
//! Later stages read state written by earlier ones, so the order is fixed.
//!
//! Failure semantics: only the history write propagates to the caller. Every
//! later stage is caught and logged, leaving earlier persisted state intact;
//! a failed stage degrades future analytics accuracy but never corrupts
//! what was already written, and nothing is ever rolled back.

use anyhow::{Context as _, Result};
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::achievements::{self, AttemptContext};
use crate::analytics;
use crate::error::SubmitError;
use crate::events::AnalyticsBus;
use crate::model::{
    Difficulty, ProcessedQuizResult, Question, QuestionAttempt, QuizMode, SubmitOutcome, XpUpdate,
};
use crate::profile;
use crate::progression;
use crate::storage::{keys, Storage};
use crate::streak::{self, StreakUpdate};

/// One completed quiz, as handed over by the quiz-taking screen.
#[derive(Debug, Clone)]
pub struct QuizSubmission {
    pub attempts: Vec<QuestionAttempt>,
    pub total_time_ms: u64,
    pub mode: QuizMode,
    pub subject_id: String,
    pub subject_title: String,
    pub topic_id: Option<String>,
    pub topic_title: String,
    /// The questions this quiz was built from, as served by the question
    /// bank. Used to validate attempt ids and derive the quiz difficulty.
    /// May be empty when the caller has no catalog at hand.
    pub questions: Vec<Question>,
}

/// Process one submission end to end. See the module docs for stage order
/// and failure semantics.
pub async fn process(
    storage: &Storage,
    bus: &AnalyticsBus,
    submission: QuizSubmission,
) -> Result<SubmitOutcome, SubmitError> {
    let QuizSubmission {
        attempts,
        total_time_ms,
        mode,
        subject_id,
        subject_title,
        topic_id,
        topic_title,
        questions,
    } = submission;

    if attempts.is_empty() {
        return Err(SubmitError::EmptyAttempts);
    }
    if !questions.is_empty() {
        let known: HashSet<&str> = questions.iter().map(|q| q.id.as_str()).collect();
        if let Some(stray) = attempts
            .iter()
            .find(|a| !known.contains(a.question_id.as_str()))
        {
            return Err(SubmitError::UnknownQuestion {
                question_id: stray.question_id.clone(),
            });
        }
    }

    let now = Utc::now();
    let total = attempts.len() as u32;
    let correct = attempts.iter().filter(|a| a.is_correct()).count() as u32;
    // The one place the score is computed; everything downstream consumes it.
    let score = 100.0 * correct as f64 / total as f64;
    let avg_time_per_question_ms = total_time_ms as f64 / total as f64;
    let difficulty = quiz_difficulty(&questions);
    let lightning_correct = attempts
        .iter()
        .filter(|a| a.is_correct() && a.time_spent_ms < 5_000)
        .count() as u32;
    let skipped = attempts
        .iter()
        .filter(|a| a.is_skipped || a.selected_option_id.is_none())
        .count() as u32;

    let result = ProcessedQuizResult {
        id: Uuid::new_v4().to_string(),
        subject_id: subject_id.clone(),
        subject_title: subject_title.clone(),
        topic_id: topic_id.clone(),
        topic_title: topic_title.clone(),
        mode,
        score,
        correct_count: correct,
        total_count: total,
        duration_ms: total_time_ms,
        attempts,
        created_at: now,
    };

    // Stage 1: history. The one loss the caller must hear about.
    append_history(storage, &result)
        .await
        .map_err(SubmitError::History)?;
    debug!(result_id = %result.id, subject = %subject_id, score, "quiz result persisted");

    // Stage 2: aggregate analytics.
    if let Err(err) = update_aggregates(storage, &result, avg_time_per_question_ms, now).await {
        warn!(%err, "aggregate analytics update failed; continuing");
    }

    // Stage 3: cumulative user stats.
    if let Err(err) = update_user_stats(storage, &result, now).await {
        warn!(%err, "user stats update failed; continuing");
    }

    // Stage 4: streak. A failed update falls back to the read-only view so
    // XP and achievements still see a plausible streak.
    let streak_update = match streak::update_streak(storage, now).await {
        Ok(update) => update,
        Err(err) => {
            warn!(%err, "streak update failed; using read-only streak");
            StreakUpdate {
                streak: streak::current_streak(storage, now).await.unwrap_or(0),
                reset_from: None,
            }
        }
    };
    if let Err(err) = mirror_streak(storage, streak_update.streak, now).await {
        warn!(%err, "streak mirror into profile failed; continuing");
    }

    // Stage 5: XP and level.
    let time_spent_secs = total_time_ms / 1_000;
    let xp = match progression::update_user_xp(
        storage,
        correct,
        total,
        time_spent_secs,
        mode,
        difficulty,
        streak_update.streak,
        now,
    )
    .await
    {
        Ok(xp) => xp,
        Err(err) => {
            warn!(%err, "xp update failed; reporting unchanged xp");
            match profile::load_or_init(storage, now).await {
                Ok(p) => XpUpdate::unchanged(p.stats.xp, p.level),
                Err(_) => XpUpdate::unchanged(0, 1),
            }
        }
    };

    // Stage 6: achievements.
    let ctx = AttemptContext {
        correct,
        total,
        score,
        time_spent_secs,
        mode,
        difficulty,
        skipped,
        lightning_correct,
        streak: streak_update.streak,
        streak_reset_from: streak_update.reset_from,
        now,
    };
    let unlocked = match achievements::check_achievements(storage, &ctx).await {
        Ok(unlocked) => unlocked,
        Err(err) => {
            warn!(%err, "achievement check failed; continuing");
            Vec::new()
        }
    };

    // Stage 7: let stats screens refresh.
    bus.notify();

    Ok(SubmitOutcome {
        result,
        xp,
        unlocked,
    })
}

/// Prepend the result to the history list. Holds the `history` key lock so
/// concurrent submissions each append exactly one entry.
async fn append_history(storage: &Storage, result: &ProcessedQuizResult) -> Result<()> {
    let _guard = storage.lock_key(keys::HISTORY).await;
    let mut history = storage
        .get_json::<Vec<ProcessedQuizResult>>(keys::HISTORY)
        .await
        .context("read history")?
        .unwrap_or_default();
    history.insert(0, result.clone());
    storage
        .set_json(keys::HISTORY, &history)
        .await
        .context("write history")
}

async fn update_aggregates(
    storage: &Storage,
    result: &ProcessedQuizResult,
    avg_time_per_question_ms: f64,
    now: DateTime<Utc>,
) -> Result<()> {
    analytics::update_subject(
        storage,
        &result.subject_id,
        &result.subject_title,
        result.correct_count,
        result.total_count,
        avg_time_per_question_ms,
        result.mode,
        result.score,
        now,
    )
    .await?;

    if let Some(topic_id) = &result.topic_id {
        analytics::update_topic(
            storage,
            topic_id,
            &result.topic_title,
            result.correct_count,
            result.total_count,
            avg_time_per_question_ms,
            result.mode,
            result.score,
            now,
        )
        .await?;
    }

    analytics::update_questions(
        storage,
        &result.attempts,
        &result.subject_id,
        result.topic_id.as_deref(),
        result.mode,
        now,
    )
    .await?;

    analytics::update_daily(
        storage,
        &now.format("%Y-%m-%d").to_string(),
        1,
        result.total_count as u64,
        result.correct_count as u64,
        result.duration_ms,
        &result.subject_id,
    )
    .await?;

    Ok(())
}

/// Fold the quiz into the cumulative user stats: totals, derived overall
/// accuracy, per-mode incremental accuracy, and the weekly counter.
async fn update_user_stats(
    storage: &Storage,
    result: &ProcessedQuizResult,
    now: DateTime<Utc>,
) -> Result<()> {
    let _guard = storage.lock_key(keys::USER_PROFILE).await;
    let mut p = profile::load_or_init(storage, now).await?;
    let stats = &mut p.stats;

    stats.total_quizzes += 1;
    stats.total_questions += result.total_count as u64;
    stats.correct_answers += result.correct_count as u64;
    stats.total_time_ms += result.duration_ms;
    stats.overall_accuracy = if stats.total_questions > 0 {
        100.0 * stats.correct_answers as f64 / stats.total_questions as f64
    } else {
        0.0
    };

    match result.mode {
        QuizMode::Practice => {
            stats.practice_quizzes += 1;
            stats.practice_accuracy =
                analytics::incremental_mean(stats.practice_accuracy, result.score, stats.practice_quizzes);
        }
        QuizMode::Test => {
            stats.test_quizzes += 1;
            stats.test_accuracy =
                analytics::incremental_mean(stats.test_accuracy, result.score, stats.test_quizzes);
        }
    }

    let anchor = profile::week_anchor(now);
    if stats.weekly_anchor != anchor {
        stats.weekly_anchor = anchor;
        stats.weekly_quizzes = 0;
    }
    stats.weekly_quizzes += 1;

    profile::save(storage, &p).await
}

/// Keep `UserStats.streak` in step with the day-based tracker, which is the
/// authoritative counter.
async fn mirror_streak(storage: &Storage, streak: u32, now: DateTime<Utc>) -> Result<()> {
    let _guard = storage.lock_key(keys::USER_PROFILE).await;
    let mut p = profile::load_or_init(storage, now).await?;
    p.stats.streak = streak;
    profile::save(storage, &p).await
}

/// The quiz-level difficulty fed to the XP formula: the most common authored
/// difficulty among the quiz's questions. Ties go to the harder tier; an
/// empty or unannotated catalog is medium.
fn quiz_difficulty(questions: &[Question]) -> Difficulty {
    let mut counts = [0usize; 3];
    for q in questions {
        match q.difficulty.unwrap_or_default() {
            Difficulty::Easy => counts[0] += 1,
            Difficulty::Medium => counts[1] += 1,
            Difficulty::Hard => counts[2] += 1,
        }
    }
    if counts.iter().all(|&c| c == 0) {
        return Difficulty::Medium;
    }
    let best = *counts.iter().max().unwrap_or(&0);
    if counts[2] == best {
        Difficulty::Hard
    } else if counts[1] == best {
        Difficulty::Medium
    } else {
        Difficulty::Easy
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionOption;

    fn question(id: &str, difficulty: Option<Difficulty>) -> Question {
        Question {
            id: id.to_string(),
            text: String::new(),
            options: vec![QuestionOption {
                id: "a".to_string(),
                text: String::new(),
            }],
            correct_option_id: "a".to_string(),
            explanation: None,
            difficulty,
            tags: vec![],
        }
    }

    #[test]
    fn quiz_difficulty_majority_wins() {
        let qs = vec![
            question("1", Some(Difficulty::Easy)),
            question("2", Some(Difficulty::Easy)),
            question("3", Some(Difficulty::Hard)),
        ];
        assert_eq!(quiz_difficulty(&qs), Difficulty::Easy);
    }

    #[test]
    fn quiz_difficulty_tie_goes_harder() {
        let qs = vec![
            question("1", Some(Difficulty::Easy)),
            question("2", Some(Difficulty::Hard)),
        ];
        assert_eq!(quiz_difficulty(&qs), Difficulty::Hard);
    }

    #[test]
    fn quiz_difficulty_defaults_to_medium() {
        assert_eq!(quiz_difficulty(&[]), Difficulty::Medium);
        let unannotated = vec![question("1", None), question("2", None)];
        assert_eq!(quiz_difficulty(&unannotated), Difficulty::Medium);
    }
}
