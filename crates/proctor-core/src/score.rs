//! Answer-key scoring and subject breakdowns.
//!
//! The scorer is pure: it reads the final answer map and the attempt's
//! question snapshot and produces a [`ScoreSummary`]. It never touches
//! storage and is only invoked from the finalize path.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerMap, Question, QuestionKind};

/// Correct/total pair for one subject tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectScore {
    pub correct: u32,
    pub total: u32,
}

/// The derived result of a completed attempt.
///
/// Never persisted before finalize; immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Choice questions answered correctly.
    pub correct: u32,
    /// Questions with a non-empty submitted value, any kind.
    pub answered: u32,
    /// All questions in the attempt, any kind.
    pub total_questions: u32,
    /// Questions that carry an answer key (the choice questions).
    /// Free-form questions are recorded but not graded, so they are
    /// excluded from the percentage denominator.
    pub graded_questions: u32,
    /// `round(correct / graded_questions * 100)`; 0 when nothing is graded.
    pub percentage: u32,
    /// Per-subject correct/total over graded questions. Subjects with no
    /// questions in the attempt are absent, not zero-padded.
    pub subjects: HashMap<String, SubjectScore>,
}

/// Outcome of a single question, for review and export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionOutcome {
    Correct,
    Incorrect,
    /// Free-form answer recorded; no correctness judgment.
    Ungraded,
    Unanswered,
}

/// Per-question result row backing the answer-review view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub subject: String,
    /// The submitted value, if any.
    pub submitted: Option<String>,
    /// The answer key, for choice questions.
    pub correct_option: Option<String>,
    pub outcome: QuestionOutcome,
}

/// Score a final answer map against the attempt's question snapshot.
pub fn score_answers(questions: &[Question], answers: &AnswerMap) -> ScoreSummary {
    let mut correct = 0u32;
    let mut answered = 0u32;
    let mut graded = 0u32;
    let mut subjects: HashMap<String, SubjectScore> = HashMap::new();

    for question in questions {
        let submitted = answers.get(&question.id).filter(|v| !v.is_empty());
        if submitted.is_some() {
            answered += 1;
        }

        if question.kind != QuestionKind::Choice {
            continue;
        }
        graded += 1;

        let entry = subjects.entry(question.subject.clone()).or_default();
        entry.total += 1;

        // Exact, case-sensitive label match. Whitespace normalization is
        // the caller's responsibility upstream.
        let is_correct = match (submitted, question.correct_option.as_deref()) {
            (Some(value), Some(key)) => value.as_str() == key,
            _ => false,
        };
        if is_correct {
            correct += 1;
            entry.correct += 1;
        }
    }

    let percentage = if graded == 0 {
        0
    } else {
        (f64::from(correct) / f64::from(graded) * 100.0).round() as u32
    };

    ScoreSummary {
        correct,
        answered,
        total_questions: questions.len() as u32,
        graded_questions: graded,
        percentage,
        subjects,
    }
}

/// Build per-question result rows in question order.
pub fn question_results(questions: &[Question], answers: &AnswerMap) -> Vec<QuestionResult> {
    questions
        .iter()
        .map(|question| {
            let submitted = answers.get(&question.id).filter(|v| !v.is_empty()).cloned();
            let outcome = match (&submitted, question.kind) {
                (None, _) => QuestionOutcome::Unanswered,
                (Some(_), QuestionKind::FreeForm) => QuestionOutcome::Ungraded,
                (Some(value), QuestionKind::Choice) => {
                    if question.correct_option.as_deref() == Some(value.as_str()) {
                        QuestionOutcome::Correct
                    } else {
                        QuestionOutcome::Incorrect
                    }
                }
            };
            QuestionResult {
                question_id: question.id.clone(),
                subject: question.subject.clone(),
                submitted,
                correct_option: question.correct_option.clone(),
                outcome,
            }
        })
        .collect()
}
