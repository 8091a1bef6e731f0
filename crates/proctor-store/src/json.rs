//! JSON file-backed attempt store.
//!
//! One pretty-printed JSON file per attempt under a base directory. This is
//! the reference persistence adapter used by the CLI; the engine never knows
//! it is talking to the filesystem.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use proctor_core::error::StoreError;
use proctor_core::model::{AnswerMap, Attempt, AttemptStatus};
use proctor_core::score::ScoreSummary;
use proctor_core::traits::AttemptStore;

/// On-disk shape of one attempt file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAttempt {
    pub attempt: Attempt,
    #[serde(default)]
    pub answers: AnswerMap,
    #[serde(default)]
    pub summary: Option<ScoreSummary>,
}

/// Attempt store writing `<base_dir>/<attempt_id>.json` files.
pub struct JsonAttemptStore {
    base_dir: PathBuf,
    // Serializes read-modify-write cycles on attempt files.
    write_lock: Mutex<()>,
}

impl JsonAttemptStore {
    /// Create a store rooted at `base_dir`, creating the directory if needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(&base_dir)?;
        Ok(Self {
            base_dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Path of the file backing `attempt_id`.
    pub fn attempt_path(&self, attempt_id: Uuid) -> PathBuf {
        self.base_dir.join(format!("{attempt_id}.json"))
    }

    /// Load one stored attempt.
    pub fn load(&self, attempt_id: Uuid) -> Result<StoredAttempt, StoreError> {
        read_stored(&self.attempt_path(attempt_id), attempt_id)
    }

    fn write(&self, stored: &StoredAttempt) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(stored)?;
        std::fs::write(self.attempt_path(stored.attempt.id), json)?;
        Ok(())
    }
}

fn read_stored(path: &Path, attempt_id: Uuid) -> Result<StoredAttempt, StoreError> {
    if !path.exists() {
        return Err(StoreError::AttemptNotFound(attempt_id));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[async_trait]
impl AttemptStore for JsonAttemptStore {
    async fn create_attempt(
        &self,
        quiz_id: &str,
        user_id: &str,
        question_ids: &[String],
    ) -> Result<Uuid, StoreError> {
        let id = Uuid::new_v4();
        let stored = StoredAttempt {
            attempt: Attempt {
                id,
                quiz_id: quiz_id.to_string(),
                user_id: user_id.to_string(),
                started_at: Utc::now(),
                question_ids: question_ids.to_vec(),
                status: AttemptStatus::InProgress,
                violation_count: 0,
                elapsed_secs: 0,
                completed_at: None,
            },
            answers: AnswerMap::new(),
            summary: None,
        };

        let _guard = self.write_lock.lock().unwrap();
        self.write(&stored)?;
        tracing::debug!(attempt_id = %id, quiz_id, "created attempt file");
        Ok(id)
    }

    async fn record_answers(
        &self,
        attempt_id: Uuid,
        answers: &AnswerMap,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap();
        let mut stored = self.load(attempt_id)?;
        stored.answers = answers.clone();
        self.write(&stored)
    }

    async fn finalize_attempt(
        &self,
        attempt_id: Uuid,
        summary: &ScoreSummary,
        elapsed_secs: u64,
        violation_count: u32,
        completed_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().unwrap();
        let mut stored = self.load(attempt_id)?;

        if stored.attempt.status == AttemptStatus::Completed {
            return Err(StoreError::AlreadyFinalized(attempt_id));
        }

        stored.attempt.status = AttemptStatus::Completed;
        stored.attempt.elapsed_secs = elapsed_secs;
        stored.attempt.violation_count = violation_count;
        stored.attempt.completed_at = Some(completed_at);
        stored.summary = Some(summary.clone());
        self.write(&stored)
    }
}
