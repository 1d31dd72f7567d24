//! Output formatters for run summaries.

use std::io::Write;

use colored::Colorize;

use crate::aggregate::GroupRollup;
use crate::core::Result;
use crate::report::RunSummary;
use crate::scoring::Tier;

/// Output format enum.
#[derive(Clone, Copy, Debug, Default)]
pub enum Format {
    #[default]
    Json,
    Markdown,
    Text,
}

impl Format {
    pub fn write_summary<W: Write>(&self, summary: &RunSummary, writer: &mut W) -> Result<()> {
        match self {
            Format::Json => write_json(summary, writer),
            Format::Markdown => write_markdown(summary, writer),
            Format::Text => write_text(summary, writer),
        }
    }
}

fn write_json<W: Write>(summary: &RunSummary, writer: &mut W) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summary)?;
    writeln!(writer)?;
    Ok(())
}

fn write_markdown<W: Write>(summary: &RunSummary, writer: &mut W) -> Result<()> {
    writeln!(writer, "# Benchmark report `{}`\n", summary.run_id)?;
    writeln!(
        writer,
        "Generated {} — {} tests, overall score **{}** ({})\n",
        summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        summary.overall.total_tests,
        summary.overall.benchmark_score,
        summary.overall.tier.as_str()
    )?;

    writeln!(writer, "## Browsers\n")?;
    writeln!(writer, "| Group | Tests | Pass % | p95 ms | Score | Tier |")?;
    writeln!(writer, "|---|---|---|---|---|---|")?;
    for group in &summary.groups {
        writeln!(
            writer,
            "| {} | {} | {} | {} | {} | {} |",
            group.label,
            group.total_tests,
            group.pass_rate_pct,
            group.duration.p95_ms,
            group.benchmark_score,
            group.tier.as_str()
        )?;
    }

    if !summary.accessibility.top_violations.is_empty() {
        writeln!(writer, "\n## Top accessibility violations\n")?;
        writeln!(writer, "| Rule | Severity | Elements | Occurrences |")?;
        writeln!(writer, "|---|---|---|---|")?;
        for v in &summary.accessibility.top_violations {
            writeln!(
                writer,
                "| {} | {:?} | {} | {} |",
                v.rule_id, v.severity, v.affected_element_count, v.occurrence_count
            )?;
        }
    }

    writeln!(writer, "\n## Slowest tests\n")?;
    writeln!(writer, "| Test | Group | Duration ms | Score | Tier |")?;
    writeln!(writer, "|---|---|---|---|---|")?;
    for test in summary.tests.iter().take(10) {
        writeln!(
            writer,
            "| {} | {} | {} | {} | {} |",
            test.record.title,
            test.record.group_label,
            test.record.duration_ms,
            test.benchmark_score,
            test.tier.as_str()
        )?;
    }
    Ok(())
}

fn write_text<W: Write>(summary: &RunSummary, writer: &mut W) -> Result<()> {
    writeln!(
        writer,
        "Run {} — {} tests, {} groups",
        summary.run_id.bold(),
        summary.overall.total_tests,
        summary.groups.len()
    )?;
    writeln!(
        writer,
        "Overall: {} [{}]",
        summary.overall.benchmark_score,
        colored_tier(summary.overall.tier)
    )?;
    for group in &summary.groups {
        write_group_line(group, writer)?;
    }
    if summary.accessibility.totals.total_findings > 0 {
        writeln!(
            writer,
            "Accessibility: {} findings ({} critical, {} serious)",
            summary.accessibility.totals.total_findings,
            summary.accessibility.totals.critical,
            summary.accessibility.totals.serious
        )?;
    }
    Ok(())
}

fn write_group_line<W: Write>(group: &GroupRollup, writer: &mut W) -> Result<()> {
    writeln!(
        writer,
        "  {:<12} {:>3} tests  pass {:>6}%  p95 {:>8}ms  score {:>6} [{}]",
        group.label,
        group.total_tests,
        group.pass_rate_pct,
        group.duration.p95_ms,
        group.benchmark_score,
        colored_tier(group.tier)
    )?;
    Ok(())
}

fn colored_tier(tier: Tier) -> String {
    let label = tier.as_str();
    match tier {
        Tier::Elite => label.green().bold().to_string(),
        Tier::Strong => label.green().to_string(),
        Tier::Stable => label.cyan().to_string(),
        Tier::Watch => label.yellow().to_string(),
        Tier::Critical => label.red().bold().to_string(),
    }
}
