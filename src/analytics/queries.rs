// SPDX-License-Identifier: MIT
//! Read-only query surface over the persisted aggregates and history.
//!
//! Nothing here writes. Callers that want the degrade-on-failure behaviour
//! of the public engine surface wrap these in a catch-and-default; the raw
//! functions stay fallible so tests can distinguish "empty" from "broken".

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::model::{ProcessedQuizResult, QuestionAnalytics, SubjectAnalytics, TopicAnalytics};
use crate::storage::{keys, Storage};

/// Merge of the last 7 daily rollups (today inclusive).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyStats {
    pub quizzes: u64,
    pub questions: u64,
    pub correct: u64,
    /// 0–100, derived from the merged totals.
    pub accuracy: f64,
    pub time_ms: u64,
    /// Days in the window with at least one quiz.
    pub active_days: u32,
    pub subjects: BTreeSet<String>,
}

/// Score trend for one topic, derived from history at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicImprovement {
    pub topic_id: String,
    pub topic_title: String,
    pub quizzes: usize,
    /// Mean score of the older half of the topic's results.
    pub older_avg: f64,
    /// Mean score of the newer half.
    pub newer_avg: f64,
    /// `newer_avg - older_avg`; always positive in query results.
    pub improvement: f64,
}

pub async fn subject_analytics(storage: &Storage, id: &str) -> Result<Option<SubjectAnalytics>> {
    storage.get_json(&keys::subject_analytics(id)).await
}

pub async fn topic_analytics(storage: &Storage, id: &str) -> Result<Option<TopicAnalytics>> {
    storage.get_json(&keys::topic_analytics(id)).await
}

pub async fn question_analytics(storage: &Storage, id: &str) -> Result<Option<QuestionAnalytics>> {
    storage.get_json(&keys::question_analytics(id)).await
}

/// The full history, newest first.
pub async fn quiz_history(storage: &Storage) -> Result<Vec<ProcessedQuizResult>> {
    Ok(storage
        .get_json::<Vec<ProcessedQuizResult>>(keys::HISTORY)
        .await?
        .unwrap_or_default())
}

/// The newest `limit` history entries.
pub async fn recent_history(storage: &Storage, limit: usize) -> Result<Vec<ProcessedQuizResult>> {
    let mut history = quiz_history(storage).await?;
    history.truncate(limit);
    Ok(history)
}

/// Merge the daily rollups of the last 7 calendar days ending at `now`.
pub async fn weekly_stats(storage: &Storage, now: DateTime<Utc>) -> Result<WeeklyStats> {
    let today = now.date_naive();
    let day_keys: Vec<String> = (0..7)
        .map(|back| keys::daily_stats(&(today - Duration::days(back)).format("%Y-%m-%d").to_string()))
        .collect();

    let rows: HashMap<String, String> = storage.get_many(&day_keys).await?;
    let mut stats = WeeklyStats::default();
    for raw in rows.values() {
        let day: crate::model::DailyStats = serde_json::from_str(raw)?;
        stats.quizzes += day.quizzes;
        stats.questions += day.questions;
        stats.correct += day.correct;
        stats.time_ms += day.time_ms;
        stats.active_days += 1;
        stats.subjects.extend(day.subjects);
    }
    if stats.questions > 0 {
        stats.accuracy = 100.0 * stats.correct as f64 / stats.questions as f64;
    }
    Ok(stats)
}

/// Questions ranked hardest first: difficulty rating descending, then
/// success rate ascending. Questions never attempted are excluded.
pub async fn most_difficult_questions(
    storage: &Storage,
    limit: usize,
) -> Result<Vec<QuestionAnalytics>> {
    let mut rows: Vec<QuestionAnalytics> = storage
        .scan_prefix(keys::QUESTION_ANALYTICS_PREFIX)
        .await?
        .into_iter()
        .filter_map(|(_, raw)| serde_json::from_str(&raw).ok())
        .filter(|q: &QuestionAnalytics| q.total_attempts > 0)
        .collect();

    rows.sort_by(|a, b| {
        b.difficulty_rating.cmp(&a.difficulty_rating).then(
            a.success_rate()
                .partial_cmp(&b.success_rate())
                .unwrap_or(std::cmp::Ordering::Equal),
        )
    });
    rows.truncate(limit);
    Ok(rows)
}

/// Topics whose recent scores beat their earlier scores, best first.
///
/// Derived from history rather than a persisted window: a topic needs at
/// least 4 results; its chronological score list is split in half and the
/// improvement is `mean(newer half) - mean(older half)`.
pub async fn most_improved_topics(
    storage: &Storage,
    limit: usize,
) -> Result<Vec<TopicImprovement>> {
    let history = quiz_history(storage).await?;

    // History is newest first; collect per-topic scores oldest first.
    let mut by_topic: HashMap<String, (String, Vec<f64>)> = HashMap::new();
    for result in history.iter().rev() {
        let Some(topic_id) = &result.topic_id else {
            continue;
        };
        let entry = by_topic
            .entry(topic_id.clone())
            .or_insert_with(|| (result.topic_title.clone(), Vec::new()));
        entry.0 = result.topic_title.clone();
        entry.1.push(result.score);
    }

    let mut improved: Vec<TopicImprovement> = by_topic
        .into_iter()
        .filter(|(_, (_, scores))| scores.len() >= 4)
        .filter_map(|(topic_id, (topic_title, scores))| {
            let mid = scores.len() / 2;
            let older_avg = scores[..mid].iter().sum::<f64>() / mid as f64;
            let newer_avg = scores[mid..].iter().sum::<f64>() / (scores.len() - mid) as f64;
            let improvement = newer_avg - older_avg;
            (improvement > 0.0).then_some(TopicImprovement {
                topic_id,
                topic_title,
                quizzes: scores.len(),
                older_avg,
                newer_avg,
                improvement,
            })
        })
        .collect();

    improved.sort_by(|a, b| {
        b.improvement
            .partial_cmp(&a.improvement)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    improved.truncate(limit);
    Ok(improved)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
