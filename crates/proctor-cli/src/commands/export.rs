//! The `proctor export` command.

use std::path::PathBuf;

use anyhow::Result;

use proctor_core::report::AttemptReport;

pub fn execute(report_path: PathBuf, format: String) -> Result<()> {
    let report = AttemptReport::load_json(&report_path)?;

    match format.as_str() {
        "csv" => print!("{}", report.to_csv()),
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        other => anyhow::bail!("unknown format: {other} (expected csv or json)"),
    }

    Ok(())
}
