//! Verdict CLI - benchmark scoring for browser test telemetry.

use std::fs::File;
use std::io::{stdout, BufReader, BufWriter};
use std::path::Path;
use std::process::ExitCode;

use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use verdict::cli::{Cli, Command, OutputFormat};
use verdict::collect::{collect_all, RawAttempt};
use verdict::config::Config;
use verdict::core::{Error, Result};
use verdict::output::Format;
use verdict::report::{build_run_summary, RunSummary};

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_default(".")?,
    };

    let format = match cli.format {
        OutputFormat::Json => Format::Json,
        OutputFormat::Markdown => Format::Markdown,
        OutputFormat::Text => Format::Text,
    };

    match cli.command {
        Command::Report(args) => {
            let generated_at = Utc::now();
            let run_id = args
                .run_id
                .unwrap_or_else(|| format!("run-{}", generated_at.format("%Y%m%d%H%M%S")));
            let records = collect_all(read_attempts(&args.input)?)?;
            let summary =
                build_run_summary(&run_id, generated_at, records, &config.thresholds);
            match args.output {
                Some(path) => {
                    let mut writer = BufWriter::new(File::create(path)?);
                    format.write_summary(&summary, &mut writer)?;
                }
                None => format.write_summary(&summary, &mut stdout())?,
            }
        }
        Command::Score(args) => {
            let records = collect_all(read_attempts(&args.input)?)?;
            let generated_at = Utc::now();
            let run_id = format!("run-{}", generated_at.format("%Y%m%d%H%M%S"));
            let summary: RunSummary =
                build_run_summary(&run_id, generated_at, records, &config.thresholds);
            let score = summary.overall.benchmark_score;
            println!("{} {}", score, summary.overall.tier.as_str());
            let floor = args.min_score.unwrap_or(config.score.min_score);
            if score < floor {
                return Err(Error::threshold_violation(
                    format!("overall score {score} below minimum {floor}"),
                    score,
                ));
            }
        }
    }

    Ok(())
}

fn read_attempts(path: &Path) -> Result<Vec<RawAttempt>> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
