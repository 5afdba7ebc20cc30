// SPDX-License-Identifier: MIT
//! Storage key layout. Composite keys are `<prefix><id>`; the prefixes end
//! with `:` so prefix scans never match across record kinds.

pub const HISTORY: &str = "history";
pub const USER_PROFILE: &str = "userProfile";
pub const STREAK_COUNT: &str = "streakCount";
pub const LAST_QUIZ_DATE: &str = "lastQuizDate";

pub const SUBJECT_ANALYTICS_PREFIX: &str = "subjectAnalytics:";
pub const TOPIC_ANALYTICS_PREFIX: &str = "topicAnalytics:";
pub const QUESTION_ANALYTICS_PREFIX: &str = "questionAnalytics:";
pub const DAILY_STATS_PREFIX: &str = "dailyStats:";

pub fn subject_analytics(subject_id: &str) -> String {
    format!("{SUBJECT_ANALYTICS_PREFIX}{subject_id}")
}

pub fn topic_analytics(topic_id: &str) -> String {
    format!("{TOPIC_ANALYTICS_PREFIX}{topic_id}")
}

pub fn question_analytics(question_id: &str) -> String {
    format!("{QUESTION_ANALYTICS_PREFIX}{question_id}")
}

/// `date` is a UTC calendar day, `%Y-%m-%d`.
pub fn daily_stats(date: &str) -> String {
    format!("{DAILY_STATS_PREFIX}{date}")
}
