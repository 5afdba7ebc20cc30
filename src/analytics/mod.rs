// SPDX-License-Identifier: MIT
//! Incremental aggregate statistics at four granularities: subject, topic,
//! question, and calendar day.
//!
//! Every update is a read-modify-write on one aggregate row, held under that
//! row's key lock so concurrent submissions never lose an update. Rows are
//! synthesised zero-valued when missing. The two running averages use the
//! round-per-step incremental mean with the post-increment count.

pub mod queries;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::model::{
    DailyStats, QuestionAnalytics, QuestionAttempt, QuizMode, SubjectAnalytics, TopicAnalytics,
};
use crate::storage::{keys, Storage};

/// `new_avg = round(((old_avg * (n-1)) + value) / n)` where `n` is the
/// post-increment observation count.
pub fn incremental_mean(old_avg: f64, value: f64, n: u64) -> f64 {
    if n == 0 {
        return 0.0;
    }
    ((old_avg * (n - 1) as f64 + value) / n as f64).round()
}

/// Difficulty 1 (easiest) to 5 (hardest) from the running success rate.
/// An unattempted question rates 3 (medium).
pub fn difficulty_rating(correct_attempts: u64, total_attempts: u64) -> u8 {
    if total_attempts == 0 {
        return 3;
    }
    let success = correct_attempts as f64 / total_attempts as f64;
    (5.0 - success * 4.0).round().clamp(1.0, 5.0) as u8
}

/// Fold one quiz into the subject's aggregate row.
pub async fn update_subject(
    storage: &Storage,
    subject_id: &str,
    title: &str,
    correct: u32,
    total: u32,
    avg_time_per_question_ms: f64,
    mode: QuizMode,
    score: f64,
    now: DateTime<Utc>,
) -> Result<SubjectAnalytics> {
    let key = keys::subject_analytics(subject_id);
    let _guard = storage.lock_key(&key).await;

    let mut row = storage
        .get_json::<SubjectAnalytics>(&key)
        .await?
        .unwrap_or_else(|| SubjectAnalytics::empty(subject_id, title));
    // Titles can be renamed in the catalog; the latest one wins.
    row.title = title.to_string();
    row.total_quizzes += 1;
    row.total_questions += total as u64;
    row.correct_answers += correct as u64;
    let n = row.total_quizzes;
    row.average_score = incremental_mean(row.average_score, score, n);
    row.avg_time_per_question_ms =
        incremental_mean(row.avg_time_per_question_ms, avg_time_per_question_ms, n);
    match mode {
        QuizMode::Practice => row.practice_count += 1,
        QuizMode::Test => row.test_count += 1,
    }
    row.last_attempted = Some(now);

    storage.set_json(&key, &row).await?;
    Ok(row)
}

/// Fold one quiz into the topic's aggregate row. Same shape as the subject
/// row; topics are optional per quiz, so these counters are independent of
/// the subject's.
pub async fn update_topic(
    storage: &Storage,
    topic_id: &str,
    title: &str,
    correct: u32,
    total: u32,
    avg_time_per_question_ms: f64,
    mode: QuizMode,
    score: f64,
    now: DateTime<Utc>,
) -> Result<TopicAnalytics> {
    let key = keys::topic_analytics(topic_id);
    let _guard = storage.lock_key(&key).await;

    let mut row = storage
        .get_json::<TopicAnalytics>(&key)
        .await?
        .unwrap_or_else(|| TopicAnalytics::empty(topic_id, title));
    row.title = title.to_string();
    row.total_quizzes += 1;
    row.total_questions += total as u64;
    row.correct_answers += correct as u64;
    let n = row.total_quizzes;
    row.average_score = incremental_mean(row.average_score, score, n);
    row.avg_time_per_question_ms =
        incremental_mean(row.avg_time_per_question_ms, avg_time_per_question_ms, n);
    match mode {
        QuizMode::Practice => row.practice_count += 1,
        QuizMode::Test => row.test_count += 1,
    }
    row.last_attempted = Some(now);

    storage.set_json(&key, &row).await?;
    Ok(row)
}

/// Fold every attempt of one quiz into its question's row. A skipped or
/// unanswered question counts as an incorrect attempt.
pub async fn update_questions(
    storage: &Storage,
    attempts: &[QuestionAttempt],
    subject_id: &str,
    topic_id: Option<&str>,
    mode: QuizMode,
    now: DateTime<Utc>,
) -> Result<()> {
    for attempt in attempts {
        let key = keys::question_analytics(&attempt.question_id);
        let _guard = storage.lock_key(&key).await;

        let mut row = storage
            .get_json::<QuestionAnalytics>(&key)
            .await?
            .unwrap_or_else(|| QuestionAnalytics::empty(&attempt.question_id, subject_id, topic_id));
        row.total_attempts += 1;
        if attempt.is_correct() {
            row.correct_attempts += 1;
        }
        row.avg_time_ms =
            incremental_mean(row.avg_time_ms, attempt.time_spent_ms as f64, row.total_attempts);
        match mode {
            QuizMode::Practice => row.practice_count += 1,
            QuizMode::Test => row.test_count += 1,
        }
        row.difficulty_rating = difficulty_rating(row.correct_attempts, row.total_attempts);
        row.last_attempted = Some(now);

        storage.set_json(&key, &row).await?;
    }
    Ok(())
}

/// Merge one quiz into the day's rollup, creating it on the first quiz of
/// the day.
pub async fn update_daily(
    storage: &Storage,
    date: &str,
    quizzes: u64,
    questions: u64,
    correct: u64,
    time_ms: u64,
    subject_id: &str,
) -> Result<DailyStats> {
    let key = keys::daily_stats(date);
    let _guard = storage.lock_key(&key).await;

    let mut row = storage
        .get_json::<DailyStats>(&key)
        .await?
        .unwrap_or_else(|| DailyStats::empty(date));
    row.quizzes += quizzes;
    row.questions += questions;
    row.correct += correct;
    row.time_ms += time_ms;
    row.subjects.insert(subject_id.to_string());

    storage.set_json(&key, &row).await?;
    Ok(row)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
