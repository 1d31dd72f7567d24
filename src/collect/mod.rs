//! Per-attempt metrics collection.
//!
//! This is the one boundary where untrusted data enters the pipeline: a
//! raw attempt blob from the test runner is deserialized into a typed
//! [`TestUnitRecord`]. Missing observations default to all-zero objects
//! (never absent fields), non-finite numbers are rejected with
//! [`Error::InvalidMetric`], and everything downstream can trust the
//! record without re-validating.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::{
    AccessibilityFinding, AccessibilitySummary, Error, ErrorObservation, NetworkObservation,
    OutcomeClass, Result, TestStatus, TestUnitRecord,
};

/// Attempt schema version this build reads.
pub const SCHEMA_VERSION: u32 = 1;

/// Browser engines recognised when falling back to title-based group
/// resolution.
const KNOWN_ENGINES: &[&str] = &["chromium", "firefox", "webkit", "chrome", "edge", "safari"];

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Raw network counters as emitted by the runner, before derived fields
/// are computed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNetwork {
    #[serde(default)]
    pub request_count: u32,
    #[serde(default)]
    pub request_failure_count: u32,
    #[serde(default)]
    pub http_error_count: u32,
    #[serde(default)]
    pub response_times_ms: Vec<f64>,
}

/// One test attempt as serialized by the runner, prior to collection.
///
/// Every telemetry field defaults so that a minimal attempt (identity,
/// status, duration) still collects into a record with all-zero
/// observations.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawAttempt {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub file_path: String,
    /// Named run group from execution-context metadata, when present.
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub attempt_number: u32,
    pub status: TestStatus,
    #[serde(default)]
    pub outcome_class: Option<OutcomeClass>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub duration_ms: f64,
    #[serde(default)]
    pub network: Option<RawNetwork>,
    #[serde(default)]
    pub console_errors: Vec<String>,
    #[serde(default)]
    pub page_errors: Vec<String>,
    #[serde(default)]
    pub accessibility_findings: Vec<AccessibilityFinding>,
}

/// Resolve the grouping dimension for a test attempt.
///
/// Precedence, which must not change: explicit run-group metadata
/// (lower-cased) wins; otherwise the first segment of the hierarchical
/// title is matched against the engine allow-list; otherwise the literal
/// `"unknown"`. Reports key every browser-level breakdown off this
/// label, and mis-resolution silently merges distinct groups.
pub fn resolve_group_label(project_name: Option<&str>, title: &str) -> String {
    if let Some(name) = project_name {
        let name = name.trim();
        if !name.is_empty() {
            return name.to_lowercase();
        }
    }

    if let Some(first) = title.split('>').next() {
        let candidate = first.trim().to_lowercase();
        if KNOWN_ENGINES.contains(&candidate.as_str()) {
            return candidate;
        }
    }

    "unknown".to_string()
}

/// Turn one raw attempt into an immutable [`TestUnitRecord`].
pub fn collect(raw: RawAttempt) -> Result<TestUnitRecord> {
    if raw.schema_version > SCHEMA_VERSION {
        return Err(Error::UnsupportedSchema {
            found: raw.schema_version,
            supported: SCHEMA_VERSION,
        });
    }

    if !raw.duration_ms.is_finite() {
        return Err(Error::InvalidMetric {
            field: "durationMs",
            value: raw.duration_ms,
        });
    }

    let net = raw.network.unwrap_or_default();
    if let Some(&bad) = net.response_times_ms.iter().find(|t| !t.is_finite()) {
        return Err(Error::InvalidMetric {
            field: "responseTimesMs",
            value: bad,
        });
    }

    let group_label = resolve_group_label(raw.project_name.as_deref(), &raw.title);
    if group_label == "unknown" {
        warn!(id = %raw.id, title = %raw.title, "attempt has no resolvable run group");
    }

    let outcome_class = raw
        .outcome_class
        .unwrap_or_else(|| classify_outcome(raw.status, raw.attempt_number));

    let record = TestUnitRecord {
        id: raw.id,
        title: raw.title,
        file_path: raw.file_path,
        group_label,
        attempt_number: raw.attempt_number,
        status: raw.status,
        outcome_class,
        started_at: raw.started_at,
        duration_ms: raw.duration_ms,
        network: NetworkObservation::new(
            net.request_count,
            net.request_failure_count,
            net.http_error_count,
            net.response_times_ms,
        ),
        errors: ErrorObservation {
            console_error_messages: raw.console_errors,
            page_error_messages: raw.page_errors,
        },
        accessibility: AccessibilitySummary::from_findings(raw.accessibility_findings),
    };
    debug!(id = %record.id, group = %record.group_label, attempt = record.attempt_number, "collected attempt");
    Ok(record)
}

/// Collect a whole batch of attempts, failing on the first invalid one.
pub fn collect_all(raw: Vec<RawAttempt>) -> Result<Vec<TestUnitRecord>> {
    raw.into_iter().map(collect).collect()
}

fn classify_outcome(status: TestStatus, attempt_number: u32) -> OutcomeClass {
    match status {
        TestStatus::Passed if attempt_number == 0 => OutcomeClass::Expected,
        TestStatus::Passed => OutcomeClass::Flaky,
        TestStatus::Skipped => OutcomeClass::Skipped,
        TestStatus::Failed | TestStatus::TimedOut => OutcomeClass::Unexpected,
    }
}
