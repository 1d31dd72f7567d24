//! Run-wide accessibility violation rollup.
//!
//! Findings from every record are deduplicated by rule id, summing the
//! affected-element counts across occurrences (not counting the
//! occurrences themselves), and ranked for top-N reporting. Severity and
//! description are taken from the first occurrence of each rule, which
//! are invariant per rule in practice.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::core::{Severity, TestUnitRecord};

/// How many ranked violations the run summary surfaces.
pub const TOP_VIOLATION_LIMIT: usize = 10;

/// One rule aggregated across every test in the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViolationRollup {
    pub rule_id: String,
    pub severity: Severity,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_reference: Option<String>,
    /// Sum of affected elements across all occurrences of this rule.
    pub affected_element_count: u32,
    /// Number of findings that rolled into this entry.
    pub occurrence_count: u32,
}

/// Rank violations by summed affected-element count, descending.
///
/// The sort is stable, so rules with equal counts keep first-encountered
/// order. The result is truncated to `limit` entries.
pub fn top_violations(records: &[TestUnitRecord], limit: usize) -> Vec<ViolationRollup> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut rollups: Vec<ViolationRollup> = Vec::new();

    for record in records {
        for finding in &record.accessibility.findings {
            match slots.get(&finding.rule_id) {
                Some(&slot) => {
                    rollups[slot].affected_element_count += finding.affected_element_count;
                    rollups[slot].occurrence_count += 1;
                }
                None => {
                    slots.insert(finding.rule_id.clone(), rollups.len());
                    rollups.push(ViolationRollup {
                        rule_id: finding.rule_id.clone(),
                        severity: finding.severity,
                        description: finding.description.clone(),
                        help_reference: finding.help_reference.clone(),
                        affected_element_count: finding.affected_element_count,
                        occurrence_count: 1,
                    });
                }
            }
        }
    }

    rollups.sort_by(|a, b| b.affected_element_count.cmp(&a.affected_element_count));
    rollups.truncate(limit);
    rollups
}
