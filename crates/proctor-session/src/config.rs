//! Session engine configuration.

use std::time::Duration;

/// Configuration for one session.
///
/// The integrity thresholds are policy, not hard-wired business logic;
/// quizzes tune them per deployment.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Total time budget for the attempt.
    pub time_limit: Duration,
    /// Focus-loss events before forced submission. The last allowed event
    /// escalates; earlier ones only warn.
    pub focus_loss_limit: u32,
    /// Whether clipboard events on free-form questions count toward the
    /// focus-loss limit. Off by default: clipboard blocks are a soft
    /// deterrent, not an integrity escalation.
    pub clipboard_escalates: bool,
    /// Retries for the finalize persistence write (beyond the first try).
    pub max_store_retries: u32,
    /// Delay between persistence retries.
    pub retry_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(10_800),
            focus_loss_limit: 2,
            clipboard_escalates: false,
            max_store_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

impl SessionConfig {
    /// Convenience constructor for a quiz-specific time budget.
    pub fn with_time_limit(secs: u64) -> Self {
        Self {
            time_limit: Duration::from_secs(secs),
            ..Self::default()
        }
    }
}
