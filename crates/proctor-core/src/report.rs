//! Completed-attempt reports with JSON persistence and CSV export.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::Attempt;
use crate::score::{QuestionOutcome, QuestionResult, ScoreSummary};

/// Everything a reviewer needs about one finished attempt: the immutable
/// attempt record, the score summary, and per-question result rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    pub attempt: Attempt,
    pub summary: ScoreSummary,
    pub results: Vec<QuestionResult>,
}

impl AttemptReport {
    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Render the per-question results as CSV, one row per question.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("Question,Subject,Your Answer,Correct Answer,Result\n");
        for r in &self.results {
            let outcome = match r.outcome {
                QuestionOutcome::Correct => "Correct",
                QuestionOutcome::Incorrect => "Incorrect",
                QuestionOutcome::Ungraded => "Ungraded",
                QuestionOutcome::Unanswered => "Unanswered",
            };
            let row = [
                r.question_id.as_str(),
                r.subject.as_str(),
                r.submitted.as_deref().unwrap_or(""),
                r.correct_option.as_deref().unwrap_or(""),
                outcome,
            ];
            let line: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
            csv.push_str(&line.join(","));
            csv.push('\n');
        }
        csv
    }
}

/// Quote a CSV field when it contains a delimiter, quote, or newline.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttemptStatus;
    use chrono::Utc;
    use std::collections::HashMap;
    use uuid::Uuid;

    fn make_report() -> AttemptReport {
        AttemptReport {
            attempt: Attempt {
                id: Uuid::nil(),
                quiz_id: "quiz-1".into(),
                user_id: "user-1".into(),
                started_at: Utc::now(),
                question_ids: vec!["q1".into(), "q2".into()],
                status: AttemptStatus::Completed,
                violation_count: 1,
                elapsed_secs: 420,
                completed_at: Some(Utc::now()),
            },
            summary: ScoreSummary {
                correct: 1,
                answered: 2,
                total_questions: 2,
                graded_questions: 2,
                percentage: 50,
                subjects: HashMap::new(),
            },
            results: vec![
                QuestionResult {
                    question_id: "q1".into(),
                    subject: "Networks".into(),
                    submitted: Some("HTTP".into()),
                    correct_option: Some("HTTP".into()),
                    outcome: QuestionOutcome::Correct,
                },
                QuestionResult {
                    question_id: "q2".into(),
                    subject: "Networks".into(),
                    submitted: Some("Hub, not Switch".into()),
                    correct_option: Some("Router".into()),
                    outcome: QuestionOutcome::Incorrect,
                },
            ],
        }
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("attempt.json");

        report.save_json(&path).unwrap();
        let loaded = AttemptReport::load_json(&path).unwrap();

        assert_eq!(loaded.attempt.quiz_id, "quiz-1");
        assert_eq!(loaded.summary.percentage, 50);
        assert_eq!(loaded.results.len(), 2);
    }

    #[test]
    fn csv_output_quotes_embedded_commas() {
        let csv = make_report().to_csv();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Question,Subject,Your Answer,Correct Answer,Result"
        );
        assert!(csv.contains("q1,Networks,HTTP,HTTP,Correct"));
        assert!(csv.contains("\"Hub, not Switch\""));
    }
}
