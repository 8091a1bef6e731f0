//! The `proctor take` command: run a complete non-interactive attempt.
//!
//! Loads a question bank, starts a session, plays a JSON answers file into
//! it, submits, and writes both the attempt record (through the store) and a
//! reviewable report file.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use comfy_table::Table;

use proctor_core::bank::parse_bank;
use proctor_core::model::SubmitReason;
use proctor_core::report::AttemptReport;
use proctor_core::score::{question_results, ScoreSummary};
use proctor_core::traits::AttemptStore;
use proctor_session::{Session, SessionConfig};
use proctor_store::{JsonAttemptStore, MemoryQuestionSource};

pub async fn execute(
    bank_path: PathBuf,
    user: String,
    answers_path: Option<PathBuf>,
    out: PathBuf,
    time_limit: Option<u64>,
) -> Result<()> {
    let bank = parse_bank(&bank_path)?;

    let submitted: HashMap<String, String> = match &answers_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read answers file: {}", path.display()))?;
            serde_json::from_str(&content).context("failed to parse answers JSON")?
        }
        None => HashMap::new(),
    };

    for id in submitted.keys() {
        if !bank.questions.iter().any(|q| &q.id == id) {
            tracing::warn!(question_id = %id, "answers file references unknown question");
        }
    }

    let questions = bank.questions.clone();
    let quiz_id = bank.id.clone();
    let limit = time_limit.unwrap_or(bank.time_limit_secs);

    let source = Arc::new(MemoryQuestionSource::from_banks(vec![bank]));
    let store = Arc::new(JsonAttemptStore::new(&out)?);

    let (handle, _events) = Session::start(
        &quiz_id,
        &user,
        source,
        Arc::clone(&store) as Arc<dyn AttemptStore>,
        SessionConfig::with_time_limit(limit),
    )
    .await?;

    // Play answers in question order; the map itself is order-insensitive.
    for question in &questions {
        if let Some(value) = submitted.get(&question.id) {
            handle.select_answer(&question.id, value).await?;
        }
    }

    let summary = handle.submit(SubmitReason::Manual).await?;

    let stored = store.load(handle.attempt_id())?;
    let report = AttemptReport {
        results: question_results(&questions, &stored.answers),
        attempt: stored.attempt,
        summary: summary.clone(),
    };
    let report_path = out.join(format!("report-{}.json", handle.attempt_id()));
    report.save_json(&report_path)?;

    print_summary(&summary);
    println!("\nReport written to {}", report_path.display());

    Ok(())
}

fn print_summary(summary: &ScoreSummary) {
    println!(
        "Score: {}/{} correct ({}%), {} of {} answered",
        summary.correct,
        summary.graded_questions,
        summary.percentage,
        summary.answered,
        summary.total_questions,
    );

    if summary.subjects.is_empty() {
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["Subject", "Correct", "Total"]);

    let mut subjects: Vec<_> = summary.subjects.iter().collect();
    subjects.sort_by(|a, b| a.0.cmp(b.0));
    for (subject, score) in subjects {
        table.add_row(vec![
            subject.clone(),
            score.correct.to_string(),
            score.total.to_string(),
        ]);
    }

    println!("\n{table}");
}
