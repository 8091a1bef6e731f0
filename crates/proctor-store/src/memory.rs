//! In-memory backends for testing and single-process use.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use proctor_core::bank::QuizBank;
use proctor_core::error::{SessionError, StoreError};
use proctor_core::model::{AnswerMap, Attempt, AttemptStatus, Question};
use proctor_core::score::ScoreSummary;
use proctor_core::traits::{AttemptStore, QuestionSource};

/// A question source backed by an in-memory map of quiz id to questions.
#[derive(Default)]
pub struct MemoryQuestionSource {
    quizzes: HashMap<String, Vec<Question>>,
}

impl MemoryQuestionSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a source from parsed bank files.
    pub fn from_banks(banks: Vec<QuizBank>) -> Self {
        let mut source = Self::new();
        for bank in banks {
            source.insert(bank.id, bank.questions);
        }
        source
    }

    /// Register (or replace) a quiz's question set.
    pub fn insert(&mut self, quiz_id: impl Into<String>, questions: Vec<Question>) {
        self.quizzes.insert(quiz_id.into(), questions);
    }
}

#[async_trait]
impl QuestionSource for MemoryQuestionSource {
    async fn load_questions(&self, quiz_id: &str) -> Result<Vec<Question>, SessionError> {
        self.quizzes
            .get(quiz_id)
            .cloned()
            .ok_or_else(|| SessionError::QuizNotFound(quiz_id.to_string()))
    }
}

#[derive(Default)]
struct MemoryStoreInner {
    attempts: HashMap<Uuid, Attempt>,
    answers: HashMap<Uuid, AnswerMap>,
    summaries: HashMap<Uuid, ScoreSummary>,
}

/// An in-memory attempt store, instrumented for engine tests.
///
/// `fail_finalizes` makes the first *n* finalize calls fail with
/// [`StoreError::Unavailable`] so the engine's bounded retry can be
/// exercised; `finalize_count` counts the writes that succeeded, which is
/// what the submit-idempotency tests assert on.
#[derive(Default)]
pub struct MemoryAttemptStore {
    inner: Mutex<MemoryStoreInner>,
    finalize_count: AtomicU32,
    finalize_failures_left: AtomicU32,
}

impl MemoryAttemptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` finalize calls before letting one through.
    pub fn fail_finalizes(&self, n: u32) {
        self.finalize_failures_left.store(n, Ordering::SeqCst);
    }

    /// Number of finalize writes that have been persisted.
    pub fn finalize_count(&self) -> u32 {
        self.finalize_count.load(Ordering::SeqCst)
    }

    /// Fetch a copy of an attempt record.
    pub fn get(&self, attempt_id: Uuid) -> Option<Attempt> {
        self.inner.lock().unwrap().attempts.get(&attempt_id).cloned()
    }

    /// Number of attempt records ever created.
    pub fn attempt_count(&self) -> usize {
        self.inner.lock().unwrap().attempts.len()
    }

    /// Fetch the persisted answers for an attempt.
    pub fn answers(&self, attempt_id: Uuid) -> Option<AnswerMap> {
        self.inner.lock().unwrap().answers.get(&attempt_id).cloned()
    }

    /// Fetch the persisted score summary for a finalized attempt.
    pub fn summary(&self, attempt_id: Uuid) -> Option<ScoreSummary> {
        self.inner.lock().unwrap().summaries.get(&attempt_id).cloned()
    }
}

#[async_trait]
impl AttemptStore for MemoryAttemptStore {
    async fn create_attempt(
        &self,
        quiz_id: &str,
        user_id: &str,
        question_ids: &[String],
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let attempt = Attempt {
            id,
            quiz_id: quiz_id.to_string(),
            user_id: user_id.to_string(),
            started_at: Utc::now(),
            question_ids: question_ids.to_vec(),
            status: AttemptStatus::InProgress,
            violation_count: 0,
            elapsed_secs: 0,
            completed_at: None,
        };
        self.inner.lock().unwrap().attempts.insert(id, attempt);
        Ok(id)
    }

    async fn record_answers(
        &self,
        attempt_id: Uuid,
        answers: &AnswerMap,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if !inner.attempts.contains_key(&attempt_id) {
            return Err(StoreError::AttemptNotFound(attempt_id));
        }
        inner.answers.insert(attempt_id, answers.clone());
        Ok(())
    }

    async fn finalize_attempt(
        &self,
        attempt_id: Uuid,
        summary: &ScoreSummary,
        elapsed_secs: u64,
        violation_count: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let failures = self.finalize_failures_left.load(Ordering::SeqCst);
        if failures > 0 {
            self.finalize_failures_left.store(failures - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("injected finalize failure".into()));
        }

        let mut inner = self.inner.lock().unwrap();
        let attempt = inner
            .attempts
            .get_mut(&attempt_id)
            .ok_or(StoreError::AttemptNotFound(attempt_id))?;

        if attempt.status == AttemptStatus::Completed {
            return Err(StoreError::AlreadyFinalized(attempt_id));
        }

        attempt.status = AttemptStatus::Completed;
        attempt.elapsed_secs = elapsed_secs;
        attempt.violation_count = violation_count;
        attempt.completed_at = Some(completed_at);
        inner.summaries.insert(attempt_id, summary.clone());

        self.finalize_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
