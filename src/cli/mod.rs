//! CLI implementation using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Verdict - Benchmark scoring for browser end-to-end test telemetry.
#[derive(Parser)]
#[command(name = "verdict")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the full benchmark report from collected attempts
    #[command(alias = "summarize")]
    Report(ReportArgs),

    /// Print the overall composite score and gate on a minimum
    #[command(alias = "gate")]
    Score(ScoreArgs),
}

#[derive(Args)]
pub struct ReportArgs {
    /// Collected attempts file (JSON array of raw attempts)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Write the summary here instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Run identifier embedded in the payload (default: derived from the
    /// generation timestamp)
    #[arg(long)]
    pub run_id: Option<String>,
}

#[derive(Args)]
pub struct ScoreArgs {
    /// Collected attempts file (JSON array of raw attempts)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Fail (non-zero exit) below this overall score
    #[arg(long)]
    pub min_score: Option<f64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    Json,
    Markdown,
    Text,
}
