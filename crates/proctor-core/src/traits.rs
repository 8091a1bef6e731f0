//! Boundary traits for the session engine's collaborators.
//!
//! These async traits are implemented by the `proctor-store` crate. The
//! engine itself only ever talks to a question source and an attempt store
//! through these contracts; transport and persistence technology are the
//! implementor's business.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{SessionError, StoreError};
use crate::model::{AnswerMap, Question};
use crate::score::ScoreSummary;

/// Supplies the ordered question set for a quiz.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Load the questions for `quiz_id`, in serving order.
    ///
    /// Returns [`SessionError::QuizNotFound`] if no such quiz exists.
    async fn load_questions(&self, quiz_id: &str) -> Result<Vec<Question>, SessionError>;
}

/// Persists attempt records and their answers.
///
/// The engine calls `create_attempt` once at session start, and
/// `record_answers` + `finalize_attempt` once during finalize. Nothing else
/// writes to the store; the timer and integrity monitor only ever reach it
/// through the engine's submit funnel.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Allocate a new attempt record with a snapshot of the question ids.
    async fn create_attempt(
        &self,
        quiz_id: &str,
        user_id: &str,
        question_ids: &[String],
    ) -> Result<Uuid, StoreError>;

    /// Persist the final answer map for an attempt.
    async fn record_answers(
        &self,
        attempt_id: Uuid,
        answers: &AnswerMap,
    ) -> Result<(), StoreError>;

    /// Flip the attempt to completed and persist its score and timings.
    ///
    /// Must reject a second finalize of the same attempt with
    /// [`StoreError::AlreadyFinalized`].
    async fn finalize_attempt(
        &self,
        attempt_id: Uuid,
        summary: &ScoreSummary,
        elapsed_secs: u64,
        violation_count: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}
