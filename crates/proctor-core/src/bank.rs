//! TOML question-bank parser.
//!
//! Loads quizzes from TOML files and directories, and validates them.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{Question, QuestionKind};

/// A quiz as authored in a bank file: metadata plus its questions.
#[derive(Debug, Clone)]
pub struct QuizBank {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Time budget for one attempt, in seconds.
    pub time_limit_secs: u64,
    pub questions: Vec<Question>,
}

fn default_time_limit() -> u64 {
    10_800 // 3 hours
}

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_time_limit")]
    time_limit_secs: u64,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    prompt: String,
    subject: String,
    #[serde(default = "default_kind_str")]
    kind: String,
    #[serde(default)]
    options: Vec<String>,
    #[serde(default)]
    correct_option: Option<String>,
}

fn default_kind_str() -> String {
    "choice".to_string()
}

/// Parse a single TOML file into a `QuizBank`.
pub fn parse_bank(path: &Path) -> Result<QuizBank> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `QuizBank` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<QuizBank> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let kind: QuestionKind = q
                .kind
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question '{}': {}", q.id, e))?;

            Ok(Question {
                id: q.id,
                prompt: q.prompt,
                subject: q.subject,
                kind,
                options: q.options,
                correct_option: q.correct_option,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(QuizBank {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        time_limit_secs: parsed.quiz.time_limit_secs,
        questions,
    })
}

/// Recursively load all `.toml` bank files from a directory.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<QuizBank>> {
    let mut banks = Vec::new();

    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            banks.extend(load_bank_directory(&path)?);
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(e) => {
                    tracing::warn!("skipping {}: {}", path.display(), e);
                }
            }
        }
    }

    Ok(banks)
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question id (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

/// Validate a quiz bank for common authoring mistakes.
///
/// Warnings are advisory; a choice question without a valid answer key is
/// additionally a hard error when a session loads the quiz.
pub fn validate_bank(bank: &QuizBank) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Duplicate question ids
    let mut seen_ids = std::collections::HashSet::new();
    for q in &bank.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: format!("duplicate question id: {}", q.id),
            });
        }
    }

    for q in &bank.questions {
        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(q.id.clone()),
                message: "prompt is empty".into(),
            });
        }

        match q.kind {
            QuestionKind::Choice => {
                if q.options.len() < 2 {
                    warnings.push(ValidationWarning {
                        question_id: Some(q.id.clone()),
                        message: "choice question has fewer than two options".into(),
                    });
                }
                if !q.has_answer_key() {
                    warnings.push(ValidationWarning {
                        question_id: Some(q.id.clone()),
                        message: "correct_option missing or not one of the options".into(),
                    });
                }
            }
            QuestionKind::FreeForm => {
                if q.correct_option.is_some() {
                    warnings.push(ValidationWarning {
                        question_id: Some(q.id.clone()),
                        message: "free-form question carries a correct_option; it will be ignored"
                            .into(),
                    });
                }
            }
        }
    }

    if bank.time_limit_secs == 0 {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "time_limit_secs is 0; attempts will expire immediately".into(),
        });
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    const VALID_TOML: &str = r#"
[quiz]
id = "networks-round-1"
title = "Computer Networks Round 1"
description = "Protocol and OSI basics"
time_limit_secs = 1800

[[questions]]
id = "net-1"
prompt = "What does IP stand for?"
subject = "Computer Networks"
kind = "choice"
options = ["Internet Protocol", "Internal Program", "Internet Procedure", "Input Protocol"]
correct_option = "Internet Protocol"

[[questions]]
id = "code-1"
prompt = "Implement a function that reverses a string."
subject = "Coding"
kind = "free-form"
"#;

    #[test]
    fn parse_valid_bank() {
        let bank = parse_bank_str(VALID_TOML, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.id, "networks-round-1");
        assert_eq!(bank.time_limit_secs, 1800);
        assert_eq!(bank.questions.len(), 2);
        assert_eq!(bank.questions[0].kind, QuestionKind::Choice);
        assert_eq!(bank.questions[1].kind, QuestionKind::FreeForm);
        assert!(validate_bank(&bank).is_empty());
    }

    #[test]
    fn parse_defaults() {
        let toml = r#"
[quiz]
id = "minimal"
title = "Minimal"

[[questions]]
id = "q1"
prompt = "Pick A or B"
subject = "General"
options = ["A", "B"]
correct_option = "A"
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        assert_eq!(bank.time_limit_secs, 10_800);
        // kind defaults to choice
        assert_eq!(bank.questions[0].kind, QuestionKind::Choice);
    }

    #[test]
    fn validate_duplicate_ids() {
        let toml = r#"
[quiz]
id = "dupes"
title = "Dupes"

[[questions]]
id = "same"
prompt = "First"
subject = "General"
options = ["A", "B"]
correct_option = "A"

[[questions]]
id = "same"
prompt = "Second"
subject = "General"
options = ["A", "B"]
correct_option = "B"
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings.iter().any(|w| w.message.contains("duplicate")));
    }

    #[test]
    fn validate_missing_answer_key() {
        let toml = r#"
[quiz]
id = "broken"
title = "Broken"

[[questions]]
id = "q1"
prompt = "Pick one"
subject = "General"
options = ["A", "B"]
correct_option = "C"
"#;
        let bank = parse_bank_str(toml, &PathBuf::from("test.toml")).unwrap();
        let warnings = validate_bank(&bank);
        assert!(warnings
            .iter()
            .any(|w| w.message.contains("correct_option")));
    }

    #[test]
    fn parse_unknown_kind_fails() {
        let toml = r#"
[quiz]
id = "bad-kind"
title = "Bad Kind"

[[questions]]
id = "q1"
prompt = "Essay time"
subject = "Writing"
kind = "essay"
"#;
        let result = parse_bank_str(toml, &PathBuf::from("test.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn parse_malformed_toml() {
        let bad = "this is not [valid toml }{";
        assert!(parse_bank_str(bad, &PathBuf::from("bad.toml")).is_err());
    }

    #[test]
    fn load_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("quiz.toml"), VALID_TOML).unwrap();

        let banks = load_bank_directory(dir.path()).unwrap();
        assert_eq!(banks.len(), 1);
        assert_eq!(banks[0].id, "networks-round-1");
    }
}
