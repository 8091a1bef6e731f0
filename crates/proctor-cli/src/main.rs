//! proctor CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "proctor", version, about = "Timed assessment session engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a complete attempt against a question bank
    Take {
        /// Path to a .toml question bank file
        #[arg(long)]
        bank: PathBuf,

        /// Test-taker identifier
        #[arg(long)]
        user: String,

        /// JSON file mapping question ids to submitted answers
        #[arg(long)]
        answers: Option<PathBuf>,

        /// Directory for attempt records and the report
        #[arg(long, default_value = "./proctor-attempts")]
        out: PathBuf,

        /// Override the bank's time limit (seconds)
        #[arg(long)]
        time_limit: Option<u64>,
    },

    /// Validate question bank TOML files
    Validate {
        /// Path to a bank file or directory
        #[arg(long)]
        bank: PathBuf,
    },

    /// Export an attempt report as CSV or JSON
    Export {
        /// Path to a report JSON file written by `take`
        #[arg(long)]
        report: PathBuf,

        /// Output format: csv, json
        #[arg(long, default_value = "csv")]
        format: String,
    },

    /// Create a starter question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("proctor=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            bank,
            user,
            answers,
            out,
            time_limit,
        } => commands::take::execute(bank, user, answers, out, time_limit).await,
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Export { report, format } => commands::export::execute(report, format),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
