//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn proctor() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("proctor").unwrap()
}

#[test]
fn validate_sample_bank() {
    proctor()
        .arg("validate")
        .arg("--bank")
        .arg("../../banks/sample-quiz.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fundamentals Round 1 (6 questions)"))
        .stdout(predicate::str::contains("All banks valid"));
}

#[test]
fn validate_bank_directory() {
    proctor()
        .arg("validate")
        .arg("--bank")
        .arg("../../banks")
        .assert()
        .success()
        .stdout(predicate::str::contains("Fundamentals Round 1"));
}

#[test]
fn validate_nonexistent_file() {
    proctor()
        .arg("validate")
        .arg("--bank")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_reports_missing_answer_key() {
    let dir = TempDir::new().unwrap();
    let bank_path = dir.path().join("broken.toml");
    std::fs::write(&bank_path, BROKEN_BANK).unwrap();

    proctor()
        .arg("validate")
        .arg("--bank")
        .arg(&bank_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("WARNING"))
        .stdout(predicate::str::contains("warning(s) found"));
}

#[test]
fn take_scores_and_writes_report() {
    let dir = TempDir::new().unwrap();
    let bank_path = dir.path().join("quiz.toml");
    let answers_path = dir.path().join("answers.json");
    let out_dir = dir.path().join("attempts");

    std::fs::write(&bank_path, SMALL_BANK).unwrap();
    std::fs::write(&answers_path, SMALL_ANSWERS).unwrap();

    proctor()
        .arg("take")
        .arg("--bank")
        .arg(&bank_path)
        .arg("--user")
        .arg("alice")
        .arg("--answers")
        .arg(&answers_path)
        .arg("--out")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 1/2 correct (50%)"))
        .stdout(predicate::str::contains("Report written to"));

    let reports: Vec<_> = std::fs::read_dir(&out_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("report-"))
        .collect();
    assert_eq!(reports.len(), 1, "exactly one report file should be written");
}

#[test]
fn take_then_export_csv() {
    let dir = TempDir::new().unwrap();
    let bank_path = dir.path().join("quiz.toml");
    let answers_path = dir.path().join("answers.json");
    let out_dir = dir.path().join("attempts");

    std::fs::write(&bank_path, SMALL_BANK).unwrap();
    std::fs::write(&answers_path, SMALL_ANSWERS).unwrap();

    proctor()
        .arg("take")
        .arg("--bank")
        .arg(&bank_path)
        .arg("--user")
        .arg("bob")
        .arg("--answers")
        .arg(&answers_path)
        .arg("--out")
        .arg(&out_dir)
        .assert()
        .success();

    let report_path = std::fs::read_dir(&out_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| {
            p.file_name()
                .map(|n| n.to_string_lossy().starts_with("report-"))
                .unwrap_or(false)
        })
        .expect("report file should exist");

    proctor()
        .arg("export")
        .arg("--report")
        .arg(&report_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Question,Subject,Your Answer,Correct Answer,Result",
        ))
        .stdout(predicate::str::contains("q1"));
}

#[test]
fn export_rejects_unknown_format() {
    proctor()
        .arg("export")
        .arg("--report")
        .arg("no_such_report.json")
        .arg("--format")
        .arg("xml")
        .assert()
        .failure();
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    proctor()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created banks/example.toml"))
        .stdout(predicate::str::contains("Created example-answers.json"));

    assert!(dir.path().join("banks/example.toml").exists());
    assert!(dir.path().join("example-answers.json").exists());
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    proctor()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    proctor()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn init_output_validates_and_takes() {
    let dir = TempDir::new().unwrap();

    proctor()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    proctor()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--bank")
        .arg("banks/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("All banks valid"));

    proctor()
        .current_dir(dir.path())
        .arg("take")
        .arg("--bank")
        .arg("banks/example.toml")
        .arg("--user")
        .arg("alice")
        .arg("--answers")
        .arg("example-answers.json")
        .assert()
        .success()
        .stdout(predicate::str::contains("(100%)"));
}

#[test]
fn help_output() {
    proctor()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Timed assessment session engine"));
}

#[test]
fn version_output() {
    proctor()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("proctor"));
}

const SMALL_BANK: &str = r#"[quiz]
id = "small"
title = "Small Quiz"
time_limit_secs = 600

[[questions]]
id = "q1"
prompt = "2 + 2 = ?"
subject = "Math"
kind = "choice"
options = ["3", "4"]
correct_option = "4"

[[questions]]
id = "q2"
prompt = "Capital of France?"
subject = "Geography"
kind = "choice"
options = ["Paris", "Lyon"]
correct_option = "Paris"
"#;

const SMALL_ANSWERS: &str = r#"{
  "q1": "4",
  "q2": "Lyon"
}
"#;

const BROKEN_BANK: &str = r#"[quiz]
id = "broken"
title = "Broken Quiz"
time_limit_secs = 600

[[questions]]
id = "q1"
prompt = "Pick one"
subject = "Misc"
kind = "choice"
options = ["a", "b"]
"#;
