// SPDX-License-Identifier: MIT
//! quizcore — quiz result processing & progression engine.
//!
//! One submission pipeline turns a completed quiz attempt into persisted
//! history, incremental statistics at four granularities, a consecutive-day
//! streak, an XP/level update, and newly unlocked achievements, then notifies
//! registered analytics listeners. All state lives in a local SQLite-backed
//! key-value store; per-key locks serialize every read-modify-write so
//! concurrent submissions never lose an update.

pub mod achievements;
pub mod analytics;
pub mod config;
pub mod error;
pub mod events;
pub mod model;
pub mod processor;
pub mod profile;
pub mod progression;
pub mod question_bank;
pub mod storage;
pub mod streak;

pub use config::EngineConfig;
pub use error::SubmitError;
pub use events::ListenerId;
pub use processor::QuizSubmission;

use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;
use tracing::warn;

use analytics::queries::{self, TopicImprovement, WeeklyStats};
use events::AnalyticsBus;
use model::{
    ProcessedQuizResult, QuestionAnalytics, SubjectAnalytics, SubmitOutcome, TopicAnalytics,
    UserProfile,
};
use storage::Storage;

/// The engine context: one process-wide instance owning the storage handle
/// and the analytics bus, created at application start-up and shared from
/// there. Cheap to clone.
///
/// Queries on this surface degrade on storage failure: they log at WARN and
/// return an empty/default view instead of propagating, so a stats screen
/// renders zeros rather than crashing. The raw fallible forms live in
/// [`analytics::queries`].
#[derive(Clone)]
pub struct Engine {
    config: EngineConfig,
    storage: Storage,
    bus: Arc<AnalyticsBus>,
}

impl Engine {
    /// Open (or create) the store under `config.data_dir` and build the
    /// engine around it.
    pub async fn open(config: EngineConfig) -> Result<Self> {
        let storage = Storage::open_with(
            &config.data_dir,
            config.storage.query_timeout_secs,
            config.storage.slow_query_ms,
        )
        .await?;
        Ok(Self {
            config,
            storage,
            bus: Arc::new(AnalyticsBus::new()),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// The single entry point a quiz-taking screen calls on completion.
    pub async fn submit_quiz_result(
        &self,
        submission: QuizSubmission,
    ) -> Result<SubmitOutcome, SubmitError> {
        processor::process(&self.storage, &self.bus, submission).await
    }

    /// Register a callback invoked after every finished submission.
    pub fn register_analytics_listener(
        &self,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> ListenerId {
        self.bus.register(listener)
    }

    pub fn unregister_analytics_listener(&self, id: ListenerId) -> bool {
        self.bus.unregister(id)
    }

    // ─── Read-only query surface ──────────────────────────────────────────────

    pub async fn subject_analytics(&self, subject_id: &str) -> Option<SubjectAnalytics> {
        queries::subject_analytics(&self.storage, subject_id)
            .await
            .unwrap_or_else(|err| {
                warn!(%err, subject_id, "subject analytics read failed");
                None
            })
    }

    pub async fn topic_analytics(&self, topic_id: &str) -> Option<TopicAnalytics> {
        queries::topic_analytics(&self.storage, topic_id)
            .await
            .unwrap_or_else(|err| {
                warn!(%err, topic_id, "topic analytics read failed");
                None
            })
    }

    pub async fn question_analytics(&self, question_id: &str) -> Option<QuestionAnalytics> {
        queries::question_analytics(&self.storage, question_id)
            .await
            .unwrap_or_else(|err| {
                warn!(%err, question_id, "question analytics read failed");
                None
            })
    }

    /// The full quiz history, newest first.
    pub async fn quiz_history(&self) -> Vec<ProcessedQuizResult> {
        queries::quiz_history(&self.storage).await.unwrap_or_else(|err| {
            warn!(%err, "history read failed");
            Vec::new()
        })
    }

    /// The newest `limit` history entries.
    pub async fn recent_history(&self, limit: usize) -> Vec<ProcessedQuizResult> {
        queries::recent_history(&self.storage, limit)
            .await
            .unwrap_or_else(|err| {
                warn!(%err, "history read failed");
                Vec::new()
            })
    }

    /// Merged rollup of the last 7 calendar days.
    pub async fn weekly_stats(&self) -> WeeklyStats {
        queries::weekly_stats(&self.storage, Utc::now())
            .await
            .unwrap_or_else(|err| {
                warn!(%err, "weekly stats read failed");
                WeeklyStats::default()
            })
    }

    /// Questions ranked hardest first by observed success rate.
    pub async fn most_difficult_questions(&self, limit: usize) -> Vec<QuestionAnalytics> {
        queries::most_difficult_questions(&self.storage, limit)
            .await
            .unwrap_or_else(|err| {
                warn!(%err, "difficult-question scan failed");
                Vec::new()
            })
    }

    /// Topics with the largest recent score improvement.
    pub async fn most_improved_topics(&self, limit: usize) -> Vec<TopicImprovement> {
        queries::most_improved_topics(&self.storage, limit)
            .await
            .unwrap_or_else(|err| {
                warn!(%err, "improved-topic scan failed");
                Vec::new()
            })
    }

    /// The user profile (stats, level, awards), created on first read.
    pub async fn user_profile(&self) -> UserProfile {
        profile::load_or_init(&self.storage, Utc::now())
            .await
            .unwrap_or_else(|err| {
                warn!(%err, "profile read failed");
                UserProfile::default()
            })
    }

    /// The streak as of now; 0 once more than a day has passed since the
    /// last quiz, without persisting that zero.
    pub async fn current_streak(&self) -> u32 {
        streak::current_streak(&self.storage, Utc::now())
            .await
            .unwrap_or_else(|err| {
                warn!(%err, "streak read failed");
                0
            })
    }
}
