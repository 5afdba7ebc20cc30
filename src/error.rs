// SPDX-License-Identifier: MIT
//! The one typed error surface of the engine.
//!
//! Everything downstream of the history write degrades instead of failing:
//! aggregate, streak, XP, and achievement errors are logged and swallowed by
//! the processor. Only the two cases a caller must act on are typed here.

/// Why a quiz submission was rejected or lost.
///
/// `History` is the one unrecoverable loss — the UI should tell the user the
/// result could not be saved and offer a retry. Secondary analytics failures
/// never surface through this type.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("cannot process a quiz with no attempts")]
    EmptyAttempts,

    #[error("attempt references question {question_id:?} not in the supplied catalog")]
    UnknownQuestion { question_id: String },

    #[error("failed to persist quiz history")]
    History(#[source] anyhow::Error),
}
