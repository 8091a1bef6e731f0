//! Core data model types for proctor.
//!
//! These are the fundamental types the entire system uses to represent
//! questions, attempts, and the observable state of a running session.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Mapping from question identifier to the submitted value.
///
/// Keys are only ever added or overwritten while an attempt is in progress;
/// they are never removed. Last write wins.
pub type AnswerMap = HashMap<String, String>;

/// What kind of answer a question expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionKind {
    /// One answer selected from a fixed set of options; auto-graded.
    Choice,
    /// Raw text or code; recorded as answered but not auto-graded.
    FreeForm,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::Choice => write!(f, "choice"),
            QuestionKind::FreeForm => write!(f, "free-form"),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "choice" | "multiple-choice" => Ok(QuestionKind::Choice),
            "free-form" | "freeform" | "coding" => Ok(QuestionKind::FreeForm),
            other => Err(format!("unknown question kind: {other}")),
        }
    }
}

/// A single question as served to a session.
///
/// Immutable once loaded into a session: an attempt keeps its own snapshot,
/// so later edits to the question bank never affect a running attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier within the quiz.
    pub id: String,
    /// The prompt shown to the test-taker.
    pub prompt: String,
    /// Subject tag used for the per-subject score breakdown.
    pub subject: String,
    /// Choice vs free-form.
    pub kind: QuestionKind,
    /// Ordered option labels. Empty for free-form questions.
    #[serde(default)]
    pub options: Vec<String>,
    /// The correct option label. Required for choice questions,
    /// meaningless for free-form ones.
    #[serde(default)]
    pub correct_option: Option<String>,
}

impl Question {
    /// Whether this question has a usable answer key.
    ///
    /// Choice questions must name a correct option that is actually one of
    /// their options. Free-form questions carry no key and always pass.
    pub fn has_answer_key(&self) -> bool {
        match self.kind {
            QuestionKind::Choice => self
                .correct_option
                .as_ref()
                .is_some_and(|c| self.options.iter().any(|o| o == c)),
            QuestionKind::FreeForm => true,
        }
    }
}

/// Lifecycle status of an attempt record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttemptStatus {
    InProgress,
    Completed,
}

impl fmt::Display for AttemptStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttemptStatus::InProgress => write!(f, "in-progress"),
            AttemptStatus::Completed => write!(f, "completed"),
        }
    }
}

/// One test-taker's run through one quiz, from creation to finalize.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attempt {
    /// Unique attempt identifier.
    pub id: Uuid,
    /// The quiz this attempt is for.
    pub quiz_id: String,
    /// The test-taker.
    pub user_id: String,
    /// When the attempt was created.
    pub started_at: DateTime<Utc>,
    /// Snapshot of the question ids served, in order.
    pub question_ids: Vec<String>,
    /// In progress until finalize flips it, exactly once.
    pub status: AttemptStatus,
    /// Focus-loss violations accumulated; monotonically non-decreasing.
    pub violation_count: u32,
    /// Total elapsed seconds at completion (0 while in progress).
    pub elapsed_secs: u64,
    /// Set by finalize; `None` while in progress.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Why a submit was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmitReason {
    /// The test-taker submitted voluntarily.
    Manual,
    /// The countdown reached zero.
    Timeout,
    /// Focus-loss violations reached the configured limit.
    Integrity,
}

impl fmt::Display for SubmitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitReason::Manual => write!(f, "manual"),
            SubmitReason::Timeout => write!(f, "timeout"),
            SubmitReason::Integrity => write!(f, "integrity"),
        }
    }
}

/// A point-in-time view of a session, for UI rendering.
///
/// Available in any state; reading it never mutates the session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Index of the question currently in view.
    pub current_index: usize,
    /// Answers recorded so far.
    pub answers: AnswerMap,
    /// Question ids flagged for review. Advisory only.
    pub review: HashSet<String>,
    /// Seconds left on the countdown.
    pub time_remaining_secs: u64,
    /// Focus-loss violations so far.
    pub violation_count: u32,
    /// In progress or completed.
    pub status: AttemptStatus,
}
