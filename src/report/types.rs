//! The serialized run-summary contract consumed by presentation layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::aggregate::violations::ViolationRollup;
use crate::aggregate::{EnrichedTestRecord, GroupRollup};
use crate::config::Thresholds;
use crate::core::AccessibilityTotals;

/// Run-level accessibility reporting: severity totals plus the ranked
/// top violations. Individual findings stay on their test records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunAccessibility {
    pub totals: AccessibilityTotals,
    pub top_violations: Vec<ViolationRollup>,
}

/// The top-level payload for one complete run. Created once, read-only
/// afterward; everything in it is plain data that serializes to a flat
/// JSON tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    /// Configured thresholds, echoed verbatim for display. Scoring uses
    /// its own hardcoded anchors.
    pub thresholds: Thresholds,
    /// Whole-run rollup (run-level composite weights, no accessibility
    /// term).
    pub overall: GroupRollup,
    pub accessibility: RunAccessibility,
    /// Per-group rollups, best composite first.
    pub groups: Vec<GroupRollup>,
    /// All surviving test records, slowest first.
    pub tests: Vec<EnrichedTestRecord>,
}
