//! The `proctor init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    std::fs::create_dir_all("banks")?;
    let bank_path = std::path::Path::new("banks/example.toml");
    if bank_path.exists() {
        println!("banks/example.toml already exists, skipping.");
    } else {
        std::fs::write(bank_path, EXAMPLE_BANK)?;
        println!("Created banks/example.toml");
    }

    let answers_path = std::path::Path::new("example-answers.json");
    if answers_path.exists() {
        println!("example-answers.json already exists, skipping.");
    } else {
        std::fs::write(answers_path, EXAMPLE_ANSWERS)?;
        println!("Created example-answers.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit banks/example.toml with your questions");
    println!("  2. Run: proctor validate --bank banks/example.toml");
    println!("  3. Run: proctor take --bank banks/example.toml --user alice --answers example-answers.json");

    Ok(())
}

const EXAMPLE_BANK: &str = r#"[quiz]
id = "example"
title = "Example Assessment"
description = "A starter quiz to get going"
time_limit_secs = 1800

[[questions]]
id = "net-1"
prompt = "What does IP stand for?"
subject = "Computer Networks"
kind = "choice"
options = ["Internet Protocol", "Internal Program", "Internet Procedure", "Input Protocol"]
correct_option = "Internet Protocol"

[[questions]]
id = "c-1"
prompt = "Which loop is guaranteed to execute at least once?"
subject = "C Language"
kind = "choice"
options = ["for", "while", "do-while", "if"]
correct_option = "do-while"

[[questions]]
id = "code-1"
prompt = "Write a function that reverses a string."
subject = "Coding"
kind = "free-form"
"#;

const EXAMPLE_ANSWERS: &str = r#"{
  "net-1": "Internet Protocol",
  "c-1": "do-while",
  "code-1": "fn reverse(s: &str) -> String { s.chars().rev().collect() }"
}
"#;
