//! Session and storage error types.
//!
//! Defined in `proctor-core` so the session engine and storage adapters can
//! classify failures without string matching. The taxonomy is three-way:
//! not-found (fatal at loading), invalid operation (rejected, session
//! continues), and storage failure (retried, then surfaced non-destructively).

use thiserror::Error;
use uuid::Uuid;

/// Errors surfaced by the session engine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No question set exists for the requested quiz. Fatal at loading.
    #[error("quiz not found: {0}")]
    QuizNotFound(String),

    /// A choice question has no valid correct-option reference.
    /// Caught at loading so it can never become a scoring-time crash.
    #[error("question '{question_id}' has no valid answer key")]
    MissingAnswerKey { question_id: String },

    /// An operation referenced a question id outside the attempt's snapshot.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// A mutation was attempted while the session was not in progress.
    #[error("session is not in progress ({status})")]
    NotInProgress { status: &'static str },

    /// Navigation target outside `[0, count)`. Rejected, never clamped.
    #[error("index {index} out of range for {count} questions")]
    IndexOutOfRange { index: i64, count: usize },

    /// Persistence failed while creating the attempt record.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// The finalize write failed after every retry. The in-memory answer
    /// map is intact; the caller may retry `submit`.
    #[error("submission failed after {attempts} attempt(s)")]
    SubmissionFailed { attempts: u32 },

    /// The session's actor task is gone.
    #[error("session closed")]
    SessionClosed,
}

impl SessionError {
    /// Whether the session can keep running after this error.
    ///
    /// Invalid operations leave the session unaffected; everything else is
    /// fatal either to session creation or to the current submit attempt.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SessionError::UnknownQuestion(_)
                | SessionError::NotInProgress { .. }
                | SessionError::IndexOutOfRange { .. }
                | SessionError::SubmissionFailed { .. }
        )
    }
}

/// Errors from an [`AttemptStore`](crate::traits::AttemptStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The attempt record does not exist.
    #[error("attempt not found: {0}")]
    AttemptNotFound(Uuid),

    /// Finalize was called on an already-finalized attempt.
    #[error("attempt already finalized: {0}")]
    AlreadyFinalized(Uuid),

    /// The backend is temporarily unable to serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Filesystem error from a file-backed store.
    #[error("store I/O error")]
    Io(#[from] std::io::Error),

    /// Serialization error from a file-backed store.
    #[error("store serialization error")]
    Serde(#[from] serde_json::Error),
}
