//! Integrity monitoring: focus-loss counting and clipboard suppression.
//!
//! The monitor is pure bookkeeping. It decides outcomes; the session actor
//! acts on them (emitting warnings, invoking the submit funnel). It never
//! touches storage itself.

use proctor_core::model::QuestionKind;

use crate::config::SessionConfig;

/// What the session should do after a focus-loss event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusOutcome {
    /// Violation counted; warn the test-taker, keep going.
    Warn { violations: u32 },
    /// The configured limit was reached; force submission. Returned
    /// exactly once per session.
    Escalate { violations: u32 },
    /// Already escalated; count only.
    Ignored,
}

/// What the session should do after a clipboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardOutcome {
    /// Suppress the value and report a blocked action. No violation.
    Blocked,
    /// Clipboard policy is set to escalate and the limit was reached.
    Escalate { violations: u32 },
    /// Not a monitored context (choice question), or already escalated.
    Ignored,
}

/// Tracks focus-loss violations and clipboard policy for one session.
#[derive(Debug)]
pub struct IntegrityMonitor {
    violations: u32,
    escalated: bool,
    focus_loss_limit: u32,
    clipboard_escalates: bool,
}

impl IntegrityMonitor {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            violations: 0,
            escalated: false,
            focus_loss_limit: config.focus_loss_limit.max(1),
            clipboard_escalates: config.clipboard_escalates,
        }
    }

    /// Violations so far. Monotonically non-decreasing.
    pub fn violations(&self) -> u32 {
        self.violations
    }

    /// Record a loss of foreground visibility.
    pub fn record_focus_loss(&mut self) -> FocusOutcome {
        self.violations += 1;
        if self.escalated {
            return FocusOutcome::Ignored;
        }
        if self.violations >= self.focus_loss_limit {
            self.escalated = true;
            FocusOutcome::Escalate {
                violations: self.violations,
            }
        } else {
            FocusOutcome::Warn {
                violations: self.violations,
            }
        }
    }

    /// Record a copy/cut/paste event on the given question kind.
    pub fn record_clipboard(&mut self, kind: QuestionKind) -> ClipboardOutcome {
        if kind != QuestionKind::FreeForm {
            return ClipboardOutcome::Ignored;
        }
        if self.clipboard_escalates {
            self.violations += 1;
            if !self.escalated && self.violations >= self.focus_loss_limit {
                self.escalated = true;
                return ClipboardOutcome::Escalate {
                    violations: self.violations,
                };
            }
        }
        if self.escalated {
            ClipboardOutcome::Ignored
        } else {
            ClipboardOutcome::Blocked
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monitor() -> IntegrityMonitor {
        IntegrityMonitor::new(&SessionConfig::default())
    }

    #[test]
    fn first_strike_warns_second_escalates() {
        let mut m = monitor();
        assert_eq!(m.record_focus_loss(), FocusOutcome::Warn { violations: 1 });
        assert_eq!(
            m.record_focus_loss(),
            FocusOutcome::Escalate { violations: 2 }
        );
    }

    #[test]
    fn escalation_happens_exactly_once() {
        let mut m = monitor();
        m.record_focus_loss();
        m.record_focus_loss();
        assert_eq!(m.record_focus_loss(), FocusOutcome::Ignored);
        assert_eq!(m.record_focus_loss(), FocusOutcome::Ignored);
        // The count keeps rising even after escalation.
        assert_eq!(m.violations(), 4);
    }

    #[test]
    fn configurable_limit() {
        let config = SessionConfig {
            focus_loss_limit: 4,
            ..SessionConfig::default()
        };
        let mut m = IntegrityMonitor::new(&config);
        for expected in 1..4 {
            assert_eq!(
                m.record_focus_loss(),
                FocusOutcome::Warn {
                    violations: expected
                }
            );
        }
        assert_eq!(
            m.record_focus_loss(),
            FocusOutcome::Escalate { violations: 4 }
        );
    }

    #[test]
    fn clipboard_blocks_without_counting() {
        let mut m = monitor();
        assert_eq!(
            m.record_clipboard(QuestionKind::FreeForm),
            ClipboardOutcome::Blocked
        );
        assert_eq!(
            m.record_clipboard(QuestionKind::FreeForm),
            ClipboardOutcome::Blocked
        );
        assert_eq!(m.violations(), 0);
    }

    #[test]
    fn clipboard_ignored_on_choice_questions() {
        let mut m = monitor();
        assert_eq!(
            m.record_clipboard(QuestionKind::Choice),
            ClipboardOutcome::Ignored
        );
    }

    #[test]
    fn clipboard_can_escalate_when_configured() {
        let config = SessionConfig {
            clipboard_escalates: true,
            ..SessionConfig::default()
        };
        let mut m = IntegrityMonitor::new(&config);
        assert_eq!(
            m.record_clipboard(QuestionKind::FreeForm),
            ClipboardOutcome::Blocked
        );
        assert_eq!(
            m.record_clipboard(QuestionKind::FreeForm),
            ClipboardOutcome::Escalate { violations: 2 }
        );
        assert_eq!(
            m.record_clipboard(QuestionKind::FreeForm),
            ClipboardOutcome::Ignored
        );
    }

    #[test]
    fn mixed_signals_share_the_limit_when_escalating() {
        let config = SessionConfig {
            clipboard_escalates: true,
            ..SessionConfig::default()
        };
        let mut m = IntegrityMonitor::new(&config);
        assert_eq!(m.record_focus_loss(), FocusOutcome::Warn { violations: 1 });
        assert_eq!(
            m.record_clipboard(QuestionKind::FreeForm),
            ClipboardOutcome::Escalate { violations: 2 }
        );
    }
}
