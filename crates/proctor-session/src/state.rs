//! The pure session state machine.
//!
//! `SessionState` owns the question snapshot, answer map, review flags,
//! current index, countdown, and lifecycle phase. It is synchronous and
//! side-effect free; the actor in [`crate::session`] drives it and performs
//! the storage I/O. All the lifecycle transition rules live here, which is
//! what makes them unit-testable without a runtime.

use std::collections::{HashMap, HashSet};

use proctor_core::error::SessionError;
use proctor_core::model::{AnswerMap, AttemptStatus, Question, SessionSnapshot};

use crate::config::SessionConfig;
use crate::integrity::{ClipboardOutcome, FocusOutcome, IntegrityMonitor};

/// Lifecycle phase of a running session.
///
/// `loading` has no representation here: a session that fails to load never
/// constructs a `SessionState` at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The only phase in which mutation is permitted.
    InProgress,
    /// Finalize in flight; entered by exactly one trigger.
    Finalizing,
    /// Terminal. Read queries only.
    Completed,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::InProgress => "in-progress",
            Phase::Finalizing => "finalizing",
            Phase::Completed => "completed",
        }
    }
}

/// State for one attempt, owned by the session actor.
pub struct SessionState {
    questions: Vec<Question>,
    index_by_id: HashMap<String, usize>,
    answers: AnswerMap,
    review: HashSet<String>,
    current_index: usize,
    remaining_secs: u64,
    expiry_reported: bool,
    phase: Phase,
    monitor: IntegrityMonitor,
}

impl SessionState {
    pub fn new(questions: Vec<Question>, config: &SessionConfig) -> Self {
        let index_by_id = questions
            .iter()
            .enumerate()
            .map(|(i, q)| (q.id.clone(), i))
            .collect();
        Self {
            questions,
            index_by_id,
            answers: AnswerMap::new(),
            review: HashSet::new(),
            current_index: 0,
            remaining_secs: config.time_limit.as_secs(),
            expiry_reported: false,
            phase: Phase::InProgress,
            monitor: IntegrityMonitor::new(config),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn violations(&self) -> u32 {
        self.monitor.violations()
    }

    /// Look up a question by id within the attempt's snapshot.
    pub fn question(&self, question_id: &str) -> Option<&Question> {
        self.index_by_id
            .get(question_id)
            .map(|&i| &self.questions[i])
    }

    fn require_in_progress(&self) -> Result<(), SessionError> {
        if self.phase == Phase::InProgress {
            Ok(())
        } else {
            Err(SessionError::NotInProgress {
                status: self.phase.name(),
            })
        }
    }

    fn require_known(&self, question_id: &str) -> Result<(), SessionError> {
        if self.index_by_id.contains_key(question_id) {
            Ok(())
        } else {
            Err(SessionError::UnknownQuestion(question_id.to_string()))
        }
    }

    /// Record (or overwrite) an answer. Last write wins.
    pub fn select_answer(&mut self, question_id: &str, value: String) -> Result<(), SessionError> {
        self.require_in_progress()?;
        self.require_known(question_id)?;
        self.answers.insert(question_id.to_string(), value);
        Ok(())
    }

    /// Move the current question pointer. Out-of-range targets are rejected
    /// with the state untouched; clamping would hide caller bugs.
    pub fn navigate(&mut self, to_index: i64) -> Result<(), SessionError> {
        self.require_in_progress()?;
        let count = self.questions.len();
        if to_index < 0 || to_index as usize >= count {
            return Err(SessionError::IndexOutOfRange {
                index: to_index,
                count,
            });
        }
        self.current_index = to_index as usize;
        Ok(())
    }

    /// Flip a question's membership in the review set.
    /// Returns whether the question is now flagged.
    pub fn toggle_review(&mut self, question_id: &str) -> Result<bool, SessionError> {
        self.require_in_progress()?;
        self.require_known(question_id)?;
        if self.review.remove(question_id) {
            Ok(false)
        } else {
            self.review.insert(question_id.to_string());
            Ok(true)
        }
    }

    /// Advance the countdown by one second.
    ///
    /// Returns `true` exactly once: on the tick that exhausts the budget
    /// while the session is still in progress. Ticks outside `InProgress`,
    /// and ticks after expiry has been reported, return `false`.
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::InProgress {
            return false;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 && !self.expiry_reported {
            self.expiry_reported = true;
            return true;
        }
        false
    }

    /// Record a focus-loss event. Outside `InProgress` the monitor is
    /// considered detached and the event is ignored.
    pub fn focus_loss(&mut self) -> FocusOutcome {
        if self.phase != Phase::InProgress {
            return FocusOutcome::Ignored;
        }
        self.monitor.record_focus_loss()
    }

    /// Record a clipboard event against a specific question.
    pub fn clipboard(&mut self, question_id: &str) -> Result<ClipboardOutcome, SessionError> {
        self.require_known(question_id)?;
        if self.phase != Phase::InProgress {
            return Ok(ClipboardOutcome::Ignored);
        }
        let kind = self.question(question_id).map(|q| q.kind);
        match kind {
            Some(kind) => Ok(self.monitor.record_clipboard(kind)),
            None => Err(SessionError::UnknownQuestion(question_id.to_string())),
        }
    }

    /// Try to claim the finalize transition. Only the first trigger wins;
    /// later triggers observe `false` and must treat submit as a no-op.
    pub fn begin_finalize(&mut self) -> bool {
        if self.phase == Phase::InProgress {
            self.phase = Phase::Finalizing;
            true
        } else {
            false
        }
    }

    /// The finalize write succeeded; the session is now terminal.
    pub fn complete_finalize(&mut self) {
        debug_assert_eq!(self.phase, Phase::Finalizing);
        self.phase = Phase::Completed;
    }

    /// The finalize write failed after all retries. Answers stay intact and
    /// the session re-opens so the caller can retry submit.
    pub fn abort_finalize(&mut self) {
        debug_assert_eq!(self.phase, Phase::Finalizing);
        self.phase = Phase::InProgress;
    }

    /// Point-in-time view for UI rendering. Never mutates.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            current_index: self.current_index,
            answers: self.answers.clone(),
            review: self.review.clone(),
            time_remaining_secs: self.remaining_secs,
            violation_count: self.monitor.violations(),
            status: match self.phase {
                Phase::Completed => AttemptStatus::Completed,
                _ => AttemptStatus::InProgress,
            },
        }
    }
}
