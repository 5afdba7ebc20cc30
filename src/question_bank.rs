// SPDX-License-Identifier: MIT
//! The question-bank collaborator seam. The engine only ever reads from it;
//! how questions are authored or fetched is someone else's problem.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;

use crate::model::Question;

/// Read-only source of quiz questions.
#[async_trait]
pub trait QuestionBank: Send + Sync {
    /// Up to `count` questions for `topic_id`.
    async fn fetch_questions(&self, topic_id: &str, count: usize) -> Result<Vec<Question>>;
}

/// In-memory bank with a fixed per-topic question list. Used by tests and
/// local tooling; a real catalog service implements [`QuestionBank`] itself.
#[derive(Default)]
pub struct StaticQuestionBank {
    by_topic: HashMap<String, Vec<Question>>,
}

impl StaticQuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_topic(mut self, topic_id: impl Into<String>, questions: Vec<Question>) -> Self {
        self.by_topic.insert(topic_id.into(), questions);
        self
    }
}

#[async_trait]
impl QuestionBank for StaticQuestionBank {
    async fn fetch_questions(&self, topic_id: &str, count: usize) -> Result<Vec<Question>> {
        let questions = self
            .by_topic
            .get(topic_id)
            .ok_or_else(|| anyhow!("unknown topic {topic_id:?}"))?;
        Ok(questions.iter().take(count).cloned().collect())
    }
}
