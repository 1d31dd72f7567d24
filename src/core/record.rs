//! Immutable telemetry records produced once per test attempt.
//!
//! Each record is created by the collector when a test attempt finishes
//! and never mutated afterward. Downstream stages consume these records
//! and produce new structures; nothing writes back into a record it did
//! not create.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::stats;

/// Severity of an accessibility finding, ordered worst-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    Serious,
    Moderate,
    Minor,
}

/// One detected accessibility violation class on one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityFinding {
    /// Rule identifier, e.g. "image-alt".
    pub rule_id: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_reference: Option<String>,
    pub affected_element_count: u32,
}

/// Finding counts by severity, without the finding list. Used for group
/// and run level rollups where the individual findings live elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityTotals {
    pub critical: u32,
    pub serious: u32,
    pub moderate: u32,
    pub minor: u32,
    pub total_findings: u32,
}

impl AccessibilityTotals {
    /// Merge another set of counts into this one.
    pub fn absorb(&mut self, other: &AccessibilityTotals) {
        self.critical += other.critical;
        self.serious += other.serious;
        self.moderate += other.moderate;
        self.minor += other.minor;
        self.total_findings += other.total_findings;
    }
}

/// Per-test accessibility rollup. Counts are finding instances, not
/// affected elements: `total_findings` always equals `findings.len()`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilitySummary {
    pub critical: u32,
    pub serious: u32,
    pub moderate: u32,
    pub minor: u32,
    pub total_findings: u32,
    #[serde(default)]
    pub findings: Vec<AccessibilityFinding>,
}

impl AccessibilitySummary {
    /// Build a summary from a list of findings, counting instances per
    /// severity.
    pub fn from_findings(findings: Vec<AccessibilityFinding>) -> Self {
        let mut summary = Self {
            total_findings: findings.len() as u32,
            ..Self::default()
        };
        for finding in &findings {
            match finding.severity {
                Severity::Critical => summary.critical += 1,
                Severity::Serious => summary.serious += 1,
                Severity::Moderate => summary.moderate += 1,
                Severity::Minor => summary.minor += 1,
            }
        }
        summary.findings = findings;
        summary
    }

    /// The severity counts without the finding list.
    pub fn totals(&self) -> AccessibilityTotals {
        AccessibilityTotals {
            critical: self.critical,
            serious: self.serious,
            moderate: self.moderate,
            minor: self.minor,
            total_findings: self.total_findings,
        }
    }
}

/// Per-test network telemetry. `avg_response_time_ms` and
/// `p95_response_time_ms` are derived from the samples at construction
/// time and are 0 when no request completed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkObservation {
    pub request_count: u32,
    pub request_failure_count: u32,
    /// Responses with status >= 400.
    pub http_error_count: u32,
    pub response_times_ms: Vec<f64>,
    pub avg_response_time_ms: f64,
    pub p95_response_time_ms: f64,
}

impl NetworkObservation {
    pub fn new(
        request_count: u32,
        request_failure_count: u32,
        http_error_count: u32,
        response_times_ms: Vec<f64>,
    ) -> Self {
        let avg_response_time_ms = stats::round2(stats::mean(&response_times_ms));
        let p95_response_time_ms = stats::round2(stats::percentile(&response_times_ms, 95.0));
        Self {
            request_count,
            request_failure_count,
            http_error_count,
            response_times_ms,
            avg_response_time_ms,
            p95_response_time_ms,
        }
    }
}

/// Per-test error telemetry: console errors and unhandled page
/// exceptions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorObservation {
    pub console_error_messages: Vec<String>,
    pub page_error_messages: Vec<String>,
}

/// Outcome of a test attempt as reported by the runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TestStatus {
    Passed,
    Failed,
    TimedOut,
    Skipped,
}

/// Outcome relative to expectation: a retried-then-passed test is flaky,
/// not expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutcomeClass {
    Expected,
    Unexpected,
    Flaky,
    Skipped,
}

/// One execution of one test scenario (possibly a retry attempt).
///
/// Multiple attempts of the same logical test are retained as distinct
/// records; the aggregator applies last-attempt-wins when building the
/// run-level list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestUnitRecord {
    pub id: String,
    pub title: String,
    pub file_path: String,
    /// Resolved grouping dimension, typically the browser engine name.
    pub group_label: String,
    /// 0 for the first attempt; retries count up from there.
    pub attempt_number: u32,
    pub status: TestStatus,
    pub outcome_class: OutcomeClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    pub duration_ms: f64,
    pub network: NetworkObservation,
    pub errors: ErrorObservation,
    pub accessibility: AccessibilitySummary,
}

impl TestUnitRecord {
    /// Sum of all error signals for this attempt: request failures, HTTP
    /// error responses, console errors, and unhandled page errors.
    pub fn error_signals(&self) -> u32 {
        self.network.request_failure_count
            + self.network.http_error_count
            + self.errors.console_error_messages.len() as u32
            + self.errors.page_error_messages.len() as u32
    }

    /// When this attempt finished, if its start time is known.
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
            .map(|t| t + Duration::milliseconds(self.duration_ms as i64))
    }
}
