mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "verdict-cli")]
#[command(about = "Verdict CLI - Run code and judge it against test cases on a remote engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a source file once and print its output
    Run {
        /// Language name or alias (e.g., python, cpp, js)
        #[arg(short, long)]
        language: String,

        /// Source file to execute
        #[arg(short, long)]
        file: PathBuf,

        /// File whose contents are fed to stdin
        #[arg(short, long)]
        stdin: Option<PathBuf>,

        /// Print the raw JSON report
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Judge a source file against a JSON file of test cases
    Test {
        /// Language name or alias
        #[arg(short, long)]
        language: String,

        /// Source file to judge
        #[arg(short, long)]
        file: PathBuf,

        /// Test cases: a JSON array, or an object with a "test_cases" array
        #[arg(short, long)]
        cases: PathBuf,

        /// Rewrite inputs with the configured interpreter first
        #[arg(long, default_value = "false")]
        interpret: bool,

        /// Problem statement passed to the interpreter
        #[arg(long)]
        context: Option<String>,

        /// Print the raw JSON report
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// List supported languages
    Languages,
}

fn init_tracing() {
    // stdout carries results; logs go to stderr and stay quiet unless RUST_LOG says otherwise
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            language,
            file,
            stdin,
            json,
        } => {
            commands::run_code(&language, &file, stdin.as_deref(), json).await?;
        }
        Commands::Test {
            language,
            file,
            cases,
            interpret,
            context,
            json,
        } => {
            let all_passed = commands::run_tests(
                &language,
                &file,
                &cases,
                interpret,
                context.as_deref(),
                json,
            )
            .await?;
            if !all_passed {
                std::process::exit(1);
            }
        }
        Commands::Languages => {
            commands::list_languages()?;
        }
    }

    Ok(())
}
