//! Run summary construction.
//!
//! Pure orchestration over the collector output: deduplicate retries,
//! aggregate, roll up violations, and assemble the one payload handed to
//! presentation layers. Writing the payload anywhere is the caller's
//! concern.

mod types;

pub use types::{RunAccessibility, RunSummary};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::aggregate::violations::{top_violations, TOP_VIOLATION_LIMIT};
use crate::aggregate::{aggregate, dedupe_last_attempt};
use crate::config::Thresholds;
use crate::core::TestUnitRecord;

/// Build the run summary from collected attempt records.
///
/// `run_id` and `generated_at` are supplied by the caller (generated
/// once per run, never module state), which keeps this a pure transform:
/// identical inputs yield an identical summary.
pub fn build_run_summary(
    run_id: &str,
    generated_at: DateTime<Utc>,
    records: Vec<TestUnitRecord>,
    thresholds: &Thresholds,
) -> RunSummary {
    let survivors = dedupe_last_attempt(records);
    debug!(run_id, tests = survivors.len(), "building run summary");

    let violations = top_violations(&survivors, TOP_VIOLATION_LIMIT);
    let run = aggregate(survivors);

    let mut totals = crate::core::AccessibilityTotals::default();
    for group in &run.groups {
        totals.absorb(&group.accessibility);
    }

    RunSummary {
        run_id: run_id.to_string(),
        generated_at,
        thresholds: *thresholds,
        overall: run.overall,
        accessibility: RunAccessibility {
            totals,
            top_violations: violations,
        },
        groups: run.groups,
        tests: run.tests,
    }
}
