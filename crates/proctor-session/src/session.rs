//! Session actor and the caller-facing handle.
//!
//! `Session::start` performs the loading phase (fetch questions, validate
//! answer keys, allocate the attempt record) and then spawns one actor task
//! that owns the [`SessionState`]. Every input — user actions, timer ticks,
//! integrity signals — arrives as a [`Command`] on a single mpsc queue, so
//! the state machine never observes two triggers concurrently and every
//! transition is atomic with respect to the others.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use proctor_core::error::SessionError;
use proctor_core::model::{SessionSnapshot, SubmitReason};
use proctor_core::score::{score_answers, ScoreSummary};
use proctor_core::traits::{AttemptStore, QuestionSource};

use crate::config::SessionConfig;
use crate::integrity::{ClipboardOutcome, FocusOutcome};
use crate::state::SessionState;
use crate::timer::Countdown;

/// Commands delivered to the session actor. One queue carries everything.
pub(crate) enum Command {
    SelectAnswer {
        question_id: String,
        value: String,
        resp: oneshot::Sender<Result<(), SessionError>>,
    },
    Navigate {
        to_index: i64,
        resp: oneshot::Sender<Result<(), SessionError>>,
    },
    ToggleReview {
        question_id: String,
        resp: oneshot::Sender<Result<bool, SessionError>>,
    },
    Submit {
        reason: SubmitReason,
        resp: oneshot::Sender<Result<ScoreSummary, SessionError>>,
    },
    Snapshot {
        resp: oneshot::Sender<SessionSnapshot>,
    },
    FocusLost {
        resp: oneshot::Sender<Result<(), SessionError>>,
    },
    Clipboard {
        question_id: String,
        resp: oneshot::Sender<Result<(), SessionError>>,
    },
    Tick,
}

/// Advisory signals pushed to the caller/UI layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Focus loss counted; next strikes may force submission.
    FocusWarning { violations: u32 },
    /// A clipboard action on a free-form question was suppressed.
    ClipboardBlocked { question_id: String },
    /// The attempt was finalized. `reason` tells the caller why.
    Finalized {
        reason: SubmitReason,
        summary: ScoreSummary,
    },
    /// Finalize persistence exhausted its retries; answers are preserved
    /// and a later submit will try again.
    FinalizeFailed { reason: SubmitReason, attempts: u32 },
}

/// Entry point for creating sessions.
pub struct Session;

impl Session {
    /// Load the quiz, allocate the attempt record, and spawn the session
    /// actor and its countdown.
    ///
    /// Failures here are fatal and leave no partial attempt: questions are
    /// validated before the store is asked to allocate anything.
    pub async fn start(
        quiz_id: &str,
        user_id: &str,
        source: Arc<dyn QuestionSource>,
        store: Arc<dyn AttemptStore>,
        config: SessionConfig,
    ) -> Result<(SessionHandle, mpsc::UnboundedReceiver<SessionEvent>), SessionError> {
        let questions = source.load_questions(quiz_id).await?;

        // A choice question without a usable answer key is a data-integrity
        // error at loading, never a scoring-time surprise.
        for q in &questions {
            if !q.has_answer_key() {
                return Err(SessionError::MissingAnswerKey {
                    question_id: q.id.clone(),
                });
            }
        }

        let question_ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let attempt_id = store.create_attempt(quiz_id, user_id, &question_ids).await?;

        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let actor = SessionActor {
            attempt_id,
            state: SessionState::new(questions, &config),
            store,
            config,
            events: event_tx,
            started: tokio::time::Instant::now(),
            timer: Countdown::spawn(cmd_tx.clone()),
            summary: None,
        };
        tokio::spawn(actor.run(cmd_rx));

        tracing::info!(%attempt_id, quiz_id, user_id, "session started");
        Ok((
            SessionHandle {
                attempt_id,
                tx: cmd_tx,
            },
            event_rx,
        ))
    }
}

/// Cloneable handle to a running session.
///
/// The caller holds this instead of any process-wide state; every call is
/// routed through the session's command queue.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    attempt_id: Uuid,
    tx: mpsc::UnboundedSender<Command>,
}

impl SessionHandle {
    /// The persisted attempt this session is writing to.
    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Command,
    ) -> Result<T, SessionError> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(build(tx))
            .map_err(|_| SessionError::SessionClosed)?;
        rx.await.map_err(|_| SessionError::SessionClosed)
    }

    /// Record (or overwrite) an answer for a question.
    pub async fn select_answer(
        &self,
        question_id: &str,
        value: &str,
    ) -> Result<(), SessionError> {
        self.call(|resp| Command::SelectAnswer {
            question_id: question_id.to_string(),
            value: value.to_string(),
            resp,
        })
        .await?
    }

    /// Move the current question pointer. Out-of-range targets are rejected.
    pub async fn navigate(&self, to_index: i64) -> Result<(), SessionError> {
        self.call(|resp| Command::Navigate { to_index, resp }).await?
    }

    /// Flip a question's review flag. Returns whether it is now flagged.
    pub async fn toggle_review(&self, question_id: &str) -> Result<bool, SessionError> {
        self.call(|resp| Command::ToggleReview {
            question_id: question_id.to_string(),
            resp,
        })
        .await?
    }

    /// Finalize the attempt. The single funnel for manual, timeout, and
    /// integrity completions; on an already-completed session this returns
    /// the cached summary without touching storage again.
    pub async fn submit(&self, reason: SubmitReason) -> Result<ScoreSummary, SessionError> {
        self.call(|resp| Command::Submit { reason, resp }).await?
    }

    /// Point-in-time view of the session, available in any state.
    pub async fn snapshot(&self) -> Result<SessionSnapshot, SessionError> {
        self.call(|resp| Command::Snapshot { resp }).await
    }

    /// Report that the execution context lost foreground visibility.
    /// Consequences (warning or forced submit) surface as events.
    pub async fn report_focus_loss(&self) -> Result<(), SessionError> {
        self.call(|resp| Command::FocusLost { resp }).await?
    }

    /// Report a copy/cut/paste event on a question.
    pub async fn report_clipboard(&self, question_id: &str) -> Result<(), SessionError> {
        self.call(|resp| Command::Clipboard {
            question_id: question_id.to_string(),
            resp,
        })
        .await?
    }
}

struct SessionActor {
    attempt_id: Uuid,
    state: SessionState,
    store: Arc<dyn AttemptStore>,
    config: SessionConfig,
    events: mpsc::UnboundedSender<SessionEvent>,
    started: tokio::time::Instant,
    timer: Countdown,
    summary: Option<ScoreSummary>,
}

impl SessionActor {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<Command>) {
        while let Some(cmd) = rx.recv().await {
            self.handle(cmd).await;
        }
        // All handles dropped; the Countdown drop guard stops the ticker.
        tracing::debug!(attempt_id = %self.attempt_id, "session actor stopped");
    }

    async fn handle(&mut self, cmd: Command) {
        match cmd {
            Command::SelectAnswer {
                question_id,
                value,
                resp,
            } => {
                let _ = resp.send(self.state.select_answer(&question_id, value));
            }
            Command::Navigate { to_index, resp } => {
                let _ = resp.send(self.state.navigate(to_index));
            }
            Command::ToggleReview { question_id, resp } => {
                let _ = resp.send(self.state.toggle_review(&question_id));
            }
            Command::Snapshot { resp } => {
                let _ = resp.send(self.state.snapshot());
            }
            Command::Submit { reason, resp } => {
                let result = self.finalize(reason).await;
                let _ = resp.send(result);
            }
            Command::FocusLost { resp } => {
                match self.state.focus_loss() {
                    FocusOutcome::Warn { violations } => {
                        tracing::warn!(
                            attempt_id = %self.attempt_id,
                            violations,
                            "focus loss detected"
                        );
                        let _ = self.events.send(SessionEvent::FocusWarning { violations });
                    }
                    FocusOutcome::Escalate { violations } => {
                        tracing::warn!(
                            attempt_id = %self.attempt_id,
                            violations,
                            "focus-loss limit reached; forcing submission"
                        );
                        // Failure is reported via FinalizeFailed; the
                        // violation itself is not undone.
                        let _ = self.finalize(SubmitReason::Integrity).await;
                    }
                    FocusOutcome::Ignored => {}
                }
                let _ = resp.send(Ok(()));
            }
            Command::Clipboard { question_id, resp } => {
                let result = match self.state.clipboard(&question_id) {
                    Ok(ClipboardOutcome::Blocked) => {
                        tracing::warn!(
                            attempt_id = %self.attempt_id,
                            question_id,
                            "clipboard action blocked"
                        );
                        let _ = self
                            .events
                            .send(SessionEvent::ClipboardBlocked { question_id });
                        Ok(())
                    }
                    Ok(ClipboardOutcome::Escalate { violations }) => {
                        tracing::warn!(
                            attempt_id = %self.attempt_id,
                            violations,
                            "clipboard policy limit reached; forcing submission"
                        );
                        let _ = self.finalize(SubmitReason::Integrity).await;
                        Ok(())
                    }
                    Ok(ClipboardOutcome::Ignored) => Ok(()),
                    Err(e) => Err(e),
                };
                let _ = resp.send(result);
            }
            Command::Tick => {
                if self.state.tick() {
                    tracing::info!(attempt_id = %self.attempt_id, "time budget exhausted");
                    let _ = self.finalize(SubmitReason::Timeout).await;
                }
            }
        }
    }

    /// The finalize funnel: score, persist with bounded retry, complete.
    ///
    /// Idempotent: once a summary exists it is returned as-is, so a second
    /// trigger arriving in the same tick performs no second write.
    async fn finalize(&mut self, reason: SubmitReason) -> Result<ScoreSummary, SessionError> {
        if let Some(summary) = &self.summary {
            return Ok(summary.clone());
        }
        if !self.state.begin_finalize() {
            return Err(SessionError::NotInProgress {
                status: "finalizing",
            });
        }

        let summary = score_answers(self.state.questions(), self.state.answers());
        let elapsed_secs = self.started.elapsed().as_secs();
        let violation_count = self.state.violations();
        let completed_at = Utc::now();

        let max_attempts = self.config.max_store_retries + 1;
        let mut outcome = Ok(());
        for attempt in 1..=max_attempts {
            if attempt > 1 {
                tokio::time::sleep(self.config.retry_delay).await;
            }
            let write = async {
                self.store
                    .record_answers(self.attempt_id, self.state.answers())
                    .await?;
                self.store
                    .finalize_attempt(
                        self.attempt_id,
                        &summary,
                        elapsed_secs,
                        violation_count,
                        completed_at,
                    )
                    .await
            };
            match write.await {
                Ok(()) => {
                    outcome = Ok(());
                    break;
                }
                Err(e) => {
                    tracing::warn!(
                        attempt_id = %self.attempt_id,
                        attempt,
                        error = %e,
                        "finalize write failed"
                    );
                    outcome = Err(e);
                }
            }
        }

        match outcome {
            Ok(()) => {
                self.state.complete_finalize();
                self.timer.stop();
                self.summary = Some(summary.clone());
                tracing::info!(
                    attempt_id = %self.attempt_id,
                    %reason,
                    percentage = summary.percentage,
                    "attempt finalized"
                );
                let _ = self.events.send(SessionEvent::Finalized {
                    reason,
                    summary: summary.clone(),
                });
                Ok(summary)
            }
            Err(e) => {
                // Non-destructive: answers stay in memory, the session
                // re-opens, and a later submit retries persistence.
                tracing::error!(
                    attempt_id = %self.attempt_id,
                    attempts = max_attempts,
                    error = %e,
                    "submission failed; in-memory answers preserved"
                );
                self.state.abort_finalize();
                let _ = self.events.send(SessionEvent::FinalizeFailed {
                    reason,
                    attempts: max_attempts,
                });
                Err(SessionError::SubmissionFailed {
                    attempts: max_attempts,
                })
            }
        }
    }
}
