// SPDX-License-Identifier: MIT
//! Core data model — serialisable types persisted through the KV store and
//! returned by the engine's query surface.
//!
//! All persisted types use `camelCase` field names so stored blobs stay
//! greppable with `jq` and compatible with the mobile clients that consume
//! them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ─── Quiz mode & difficulty ──────────────────────────────────────────────────

/// How a quiz was taken. Test mode earns an XP multiplier and feeds the
/// test-specific accuracy counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuizMode {
    Practice,
    Test,
}

impl QuizMode {
    pub fn is_test(self) -> bool {
        matches!(self, QuizMode::Test)
    }
}

/// Question difficulty as authored in the question bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// XP multiplier applied to the base award.
    pub fn xp_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 0.8,
            Difficulty::Medium => 1.0,
            Difficulty::Hard => 1.5,
        }
    }
}

// ─── Question bank types ─────────────────────────────────────────────────────

/// One answer option of a question.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
}

/// A question as served by the question bank. The engine treats this as
/// opaque read-only input and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub text: String,
    pub options: Vec<QuestionOption>,
    pub correct_option_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

// ─── Attempts & results ──────────────────────────────────────────────────────

/// One question's recorded answer (or skip) within a quiz session.
/// Produced by the quiz-taking UI, one per question, append-only for the
/// duration of one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAttempt {
    pub question_id: String,
    /// `None` when the question was skipped or left unanswered.
    pub selected_option_id: Option<String>,
    pub correct_option_id: String,
    pub time_spent_ms: u64,
    pub is_skipped: bool,
}

impl QuestionAttempt {
    /// An attempt is correct iff an option was selected and it matches.
    /// A skipped question is never correct.
    pub fn is_correct(&self) -> bool {
        self.selected_option_id.as_deref() == Some(self.correct_option_id.as_str())
    }
}

/// The canonical record of one completed quiz. Immutable once created;
/// appended to the history list (newest first) and never mutated afterward.
///
/// `score` is computed exactly once here (unrounded). Every other component
/// consumes this value instead of recomputing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedQuizResult {
    pub id: String,
    pub subject_id: String,
    pub subject_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    pub topic_title: String,
    pub mode: QuizMode,
    /// Percentage score, 0–100, unrounded.
    pub score: f64,
    pub correct_count: u32,
    pub total_count: u32,
    pub duration_ms: u64,
    pub attempts: Vec<QuestionAttempt>,
    pub created_at: DateTime<Utc>,
}

// ─── Aggregate rows ──────────────────────────────────────────────────────────

/// Running statistics for one subject. Counters are cumulative; the two
/// averages use the round-per-step incremental mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectAnalytics {
    pub subject_id: String,
    pub title: String,
    pub total_quizzes: u64,
    pub total_questions: u64,
    pub correct_answers: u64,
    pub average_score: f64,
    pub avg_time_per_question_ms: f64,
    pub practice_count: u64,
    pub test_count: u64,
    pub last_attempted: Option<DateTime<Utc>>,
}

impl SubjectAnalytics {
    /// Zero-valued row synthesised when a subject has no stored analytics.
    pub fn empty(subject_id: &str, title: &str) -> Self {
        Self {
            subject_id: subject_id.to_string(),
            title: title.to_string(),
            total_quizzes: 0,
            total_questions: 0,
            correct_answers: 0,
            average_score: 0.0,
            avg_time_per_question_ms: 0.0,
            practice_count: 0,
            test_count: 0,
            last_attempted: None,
        }
    }
}

/// Running statistics for one topic. Topics are optional per quiz, so these
/// counters are independent of the subject row, not a strict roll-up of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAnalytics {
    pub topic_id: String,
    pub title: String,
    pub total_quizzes: u64,
    pub total_questions: u64,
    pub correct_answers: u64,
    pub average_score: f64,
    pub avg_time_per_question_ms: f64,
    pub practice_count: u64,
    pub test_count: u64,
    pub last_attempted: Option<DateTime<Utc>>,
}

impl TopicAnalytics {
    pub fn empty(topic_id: &str, title: &str) -> Self {
        Self {
            topic_id: topic_id.to_string(),
            title: title.to_string(),
            total_quizzes: 0,
            total_questions: 0,
            correct_answers: 0,
            average_score: 0.0,
            avg_time_per_question_ms: 0.0,
            practice_count: 0,
            test_count: 0,
            last_attempted: None,
        }
    }
}

/// Per-question running statistics. `difficulty_rating` is derived from the
/// running success rate: 1 (easiest) … 5 (hardest), 3 for an untouched row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionAnalytics {
    pub question_id: String,
    pub subject_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    pub total_attempts: u64,
    pub correct_attempts: u64,
    pub avg_time_ms: f64,
    pub practice_count: u64,
    pub test_count: u64,
    pub difficulty_rating: u8,
    pub last_attempted: Option<DateTime<Utc>>,
}

impl QuestionAnalytics {
    pub fn empty(question_id: &str, subject_id: &str, topic_id: Option<&str>) -> Self {
        Self {
            question_id: question_id.to_string(),
            subject_id: subject_id.to_string(),
            topic_id: topic_id.map(str::to_string),
            total_attempts: 0,
            correct_attempts: 0,
            avg_time_ms: 0.0,
            practice_count: 0,
            test_count: 0,
            // Unattempted questions default to medium.
            difficulty_rating: 3,
            last_attempted: None,
        }
    }

    /// Running success rate, 0.0–1.0. Zero for an untouched row.
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        self.correct_attempts as f64 / self.total_attempts as f64
    }
}

/// One calendar day's rollup (UTC day, `%Y-%m-%d` key). Created on the first
/// quiz of a day, merged thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: String,
    pub quizzes: u64,
    pub questions: u64,
    pub correct: u64,
    pub time_ms: u64,
    pub subjects: BTreeSet<String>,
}

impl DailyStats {
    pub fn empty(date: &str) -> Self {
        Self {
            date: date.to_string(),
            quizzes: 0,
            questions: 0,
            correct: 0,
            time_ms: 0,
            subjects: BTreeSet::new(),
        }
    }
}

// ─── User profile ────────────────────────────────────────────────────────────

/// Cumulative per-user counters. Mutated only through the engines; persisted
/// inside [`UserProfile`] as one blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserStats {
    pub total_quizzes: u64,
    pub total_questions: u64,
    pub correct_answers: u64,
    pub total_time_ms: u64,
    /// Derived from cumulative totals, 0–100.
    pub overall_accuracy: f64,
    pub practice_quizzes: u64,
    pub test_quizzes: u64,
    /// Incremental mean of practice-mode scores.
    pub practice_accuracy: f64,
    /// Incremental mean of test-mode scores.
    pub test_accuracy: f64,
    /// Mirror of the day-based streak tracker, refreshed on every submission.
    pub streak: u32,
    /// Quizzes taken in the current ISO week; resets when the anchor rolls.
    pub weekly_quizzes: u64,
    /// Monday of the ISO week `weekly_quizzes` counts, `%Y-%m-%d`.
    pub weekly_anchor: String,
    pub xp: u64,
}

impl Default for UserStats {
    fn default() -> Self {
        Self {
            total_quizzes: 0,
            total_questions: 0,
            correct_answers: 0,
            total_time_ms: 0,
            overall_accuracy: 0.0,
            practice_quizzes: 0,
            test_quizzes: 0,
            practice_accuracy: 0.0,
            test_accuracy: 0.0,
            streak: 0,
            weekly_quizzes: 0,
            weekly_anchor: String::new(),
            xp: 0,
        }
    }
}

impl UserStats {
    pub fn total_time_hours(&self) -> f64 {
        self.total_time_ms as f64 / 3_600_000.0
    }
}

/// A named milestone with monotonic unlock state and optional bounded
/// progress. Progress only increases toward `max_progress`, except the
/// streak awards whose progress mirrors the current streak value and falls
/// when the streak breaks. `unlocked_at` is set once and never changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAward {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unlocked_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_progress: Option<u64>,
}

/// Singleton per-user record: stats, level, and the award list. Lazily
/// created with defaults on first read; persisted as one blob under the
/// `userProfile` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub stats: UserStats,
    pub level: u32,
    pub level_progress: u64,
    pub awards: Vec<UserAward>,
}

// ─── Engine outputs ──────────────────────────────────────────────────────────

/// Outcome of one XP update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpUpdate {
    pub old_xp: u64,
    pub new_xp: u64,
    pub xp_gained: u64,
    pub old_level: u32,
    pub new_level: u32,
    pub leveled_up: bool,
}

impl XpUpdate {
    /// No-op update reported when the XP stage fails and is skipped.
    pub fn unchanged(xp: u64, level: u32) -> Self {
        Self {
            old_xp: xp,
            new_xp: xp,
            xp_gained: 0,
            old_level: level,
            new_level: level,
            leveled_up: false,
        }
    }
}

/// Everything a quiz-taking screen needs after a submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitOutcome {
    pub result: ProcessedQuizResult,
    pub xp: XpUpdate,
    pub unlocked: Vec<UserAward>,
}

// ─── Tests ────────────────────────────────────────────────────────────────────
