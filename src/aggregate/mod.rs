//! Aggregation and scoring across collected test records.
//!
//! Consumes immutable [`TestUnitRecord`]s and produces enriched per-test
//! records, per-group rollups, and one overall rollup. Group statistics
//! are recomputed from the group's raw samples, never by averaging
//! member scores; the three stages intentionally carry three different
//! composite weight sets (see [`crate::scoring`]).

pub mod violations;

use std::collections::HashMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::{AccessibilityTotals, TestStatus, TestUnitRecord};
use crate::scoring::{
    accessibility_score, score_higher_better, score_lower_better, CompositeWeights, SubScores,
    Tier, GROUP_WEIGHTS, RUN_WEIGHTS, TEST_WEIGHTS,
};
use crate::stats::{clamp, mean, percentile, round2, std_dev};

// Hardcoded scoring anchors. The configured thresholds in the report
// payload are echoed for display and deliberately do not feed these
// (longstanding behavior the output contract depends on).
const TEST_DURATION_TARGET_MS: f64 = 1500.0;
const TEST_DURATION_MAX_MS: f64 = 9000.0;
const GROUP_MEAN_DURATION_TARGET_MS: f64 = 1500.0;
const GROUP_MEAN_DURATION_MAX_MS: f64 = 7000.0;
const GROUP_P95_DURATION_TARGET_MS: f64 = 3000.0;
const GROUP_P95_DURATION_MAX_MS: f64 = 9500.0;
const ERROR_SIGNAL_MAX: f64 = 6.0;
const THROUGHPUT_MIN_PER_MIN: f64 = 4.0;
const THROUGHPUT_TARGET_PER_MIN: f64 = 30.0;
const RETRY_RATE_MAX_PCT: f64 = 40.0;

/// A test record plus its computed sub-scores, composite, and tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedTestRecord {
    #[serde(flatten)]
    pub record: TestUnitRecord,
    pub scores: SubScores,
    pub benchmark_score: f64,
    pub tier: Tier,
}

/// Duration statistics over a set of records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationStats {
    pub mean_ms: f64,
    pub median_ms: f64,
    pub p95_ms: f64,
    pub p99_ms: f64,
    pub std_dev_ms: f64,
    /// std-dev divided by mean; 0 when the mean is 0.
    pub coefficient_of_variation: f64,
}

/// Network totals and rates over a set of records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    pub total_requests: u32,
    pub total_failures: u32,
    pub total_http_errors: u32,
    pub failure_rate_pct: f64,
    pub avg_response_time_ms: f64,
    pub p95_response_time_ms: f64,
}

/// Aggregate over all records sharing a group label (or the whole run).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupRollup {
    pub label: String,
    pub total_tests: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub pass_rate_pct: f64,
    pub retry_rate_pct: f64,
    pub tests_per_minute: f64,
    pub duration: DurationStats,
    pub network: NetworkStats,
    pub accessibility: AccessibilityTotals,
    pub scores: SubScores,
    pub benchmark_score: f64,
    pub tier: Tier,
}

/// Output of one aggregation pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunAggregate {
    /// All enriched records, slowest first for bottleneck visibility.
    pub tests: Vec<EnrichedTestRecord>,
    /// Per-group rollups, best composite first.
    pub groups: Vec<GroupRollup>,
    /// Whole-run rollup, scored with [`RUN_WEIGHTS`].
    pub overall: GroupRollup,
}

/// Keep only the final attempt per logical test identity.
///
/// Built as an explicit keyed map rather than relying on insertion-order
/// overwrites. First-encounter order is preserved so downstream stable
/// tie-breaks stay deterministic. The surviving record keeps its
/// `attempt_number`, which is how retries reach the reliability score.
pub fn dedupe_last_attempt(records: Vec<TestUnitRecord>) -> Vec<TestUnitRecord> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<TestUnitRecord> = Vec::new();
    for record in records {
        match index.get(&record.id) {
            Some(&slot) => {
                if record.attempt_number >= out[slot].attempt_number {
                    out[slot] = record;
                }
            }
            None => {
                index.insert(record.id.clone(), out.len());
                out.push(record);
            }
        }
    }
    out
}

/// Compute sub-scores, composite, and tier for one record.
pub fn enrich(record: TestUnitRecord) -> EnrichedTestRecord {
    let duration = score_lower_better(
        record.duration_ms,
        TEST_DURATION_TARGET_MS,
        TEST_DURATION_MAX_MS,
    );

    let base = match record.status {
        TestStatus::Passed => 100.0,
        TestStatus::Skipped => 70.0,
        TestStatus::Failed | TestStatus::TimedOut => 15.0,
    };
    let reliability = clamp(base - record.attempt_number as f64 * 15.0, 0.0, 100.0);

    let quality = score_lower_better(record.error_signals() as f64, 0.0, ERROR_SIGNAL_MAX);

    let throughput = score_higher_better(
        60_000.0 / record.duration_ms.max(1.0),
        THROUGHPUT_MIN_PER_MIN,
        THROUGHPUT_TARGET_PER_MIN,
    );

    let accessibility = accessibility_score(&record.accessibility.totals());

    let scores = SubScores {
        duration,
        reliability,
        quality,
        throughput,
        accessibility,
    };
    let benchmark_score = TEST_WEIGHTS.composite(&scores);
    EnrichedTestRecord {
        tier: Tier::from_score(benchmark_score),
        record,
        scores,
        benchmark_score,
    }
}

/// Aggregate already-deduplicated records into the run-level structures.
pub fn aggregate(records: Vec<TestUnitRecord>) -> RunAggregate {
    let enriched: Vec<EnrichedTestRecord> = records.into_iter().map(enrich).collect();

    // Bucket by group label in first-encounter order.
    let mut order: Vec<(String, Vec<usize>)> = Vec::new();
    let mut slots: HashMap<String, usize> = HashMap::new();
    for (i, e) in enriched.iter().enumerate() {
        match slots.get(&e.record.group_label) {
            Some(&slot) => order[slot].1.push(i),
            None => {
                slots.insert(e.record.group_label.clone(), order.len());
                order.push((e.record.group_label.clone(), vec![i]));
            }
        }
    }

    // Rollups are independent per group, so shard the work.
    let mut groups: Vec<GroupRollup> = order
        .par_iter()
        .map(|(label, members)| {
            let refs: Vec<&EnrichedTestRecord> = members.iter().map(|&i| &enriched[i]).collect();
            rollup(label, &refs, &GROUP_WEIGHTS)
        })
        .collect();
    groups.sort_by(|a, b| b.benchmark_score.total_cmp(&a.benchmark_score));

    let all: Vec<&EnrichedTestRecord> = enriched.iter().collect();
    let overall = rollup("overall", &all, &RUN_WEIGHTS);
    debug!(
        tests = enriched.len(),
        groups = groups.len(),
        score = overall.benchmark_score,
        "aggregated run"
    );

    let mut tests = enriched;
    tests.sort_by(|a, b| b.record.duration_ms.total_cmp(&a.record.duration_ms));

    RunAggregate {
        tests,
        groups,
        overall,
    }
}

/// Recompute every statistic and score from the members' raw samples.
fn rollup(label: &str, members: &[&EnrichedTestRecord], weights: &CompositeWeights) -> GroupRollup {
    let total = members.len();
    let durations: Vec<f64> = members.iter().map(|m| m.record.duration_ms).collect();

    let passed = members
        .iter()
        .filter(|m| m.record.status == TestStatus::Passed)
        .count();
    let failed = members
        .iter()
        .filter(|m| matches!(m.record.status, TestStatus::Failed | TestStatus::TimedOut))
        .count();
    let skipped = members
        .iter()
        .filter(|m| m.record.status == TestStatus::Skipped)
        .count();
    let retried = members
        .iter()
        .filter(|m| m.record.attempt_number > 0)
        .count();

    let pass_rate_pct = rate_pct(passed, total);
    let retry_rate_pct = rate_pct(retried, total);

    let mean_ms = mean(&durations);
    let p95_ms = percentile(&durations, 95.0);
    let sd = std_dev(&durations);
    let duration = DurationStats {
        mean_ms: round2(mean_ms),
        median_ms: round2(percentile(&durations, 50.0)),
        p95_ms: round2(p95_ms),
        p99_ms: round2(percentile(&durations, 99.0)),
        std_dev_ms: round2(sd),
        coefficient_of_variation: if mean_ms > 0.0 { round2(sd / mean_ms) } else { 0.0 },
    };

    let network = network_stats(members);

    let mut accessibility = AccessibilityTotals::default();
    for m in members {
        accessibility.absorb(&m.record.accessibility.totals());
    }

    let tests_per_minute = tests_per_minute(members);

    let error_signals: Vec<f64> = members
        .iter()
        .map(|m| m.record.error_signals() as f64)
        .collect();

    let scores = SubScores {
        duration: round2(
            score_lower_better(mean_ms, GROUP_MEAN_DURATION_TARGET_MS, GROUP_MEAN_DURATION_MAX_MS)
                * 0.6
                + score_lower_better(p95_ms, GROUP_P95_DURATION_TARGET_MS, GROUP_P95_DURATION_MAX_MS)
                    * 0.4,
        ),
        reliability: round2(
            pass_rate_pct * 0.7
                + score_lower_better(retry_rate_pct, 0.0, RETRY_RATE_MAX_PCT) * 0.3,
        ),
        quality: score_lower_better(mean(&error_signals), 0.0, ERROR_SIGNAL_MAX),
        throughput: score_higher_better(
            tests_per_minute,
            THROUGHPUT_MIN_PER_MIN,
            THROUGHPUT_TARGET_PER_MIN,
        ),
        accessibility: accessibility_score(&accessibility),
    };
    let benchmark_score = weights.composite(&scores);

    GroupRollup {
        label: label.to_string(),
        total_tests: total,
        passed,
        failed,
        skipped,
        pass_rate_pct,
        retry_rate_pct,
        tests_per_minute,
        duration,
        network,
        accessibility,
        scores,
        benchmark_score,
        tier: Tier::from_score(benchmark_score),
    }
}

fn rate_pct(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(part as f64 / total as f64 * 100.0)
}

fn network_stats(members: &[&EnrichedTestRecord]) -> NetworkStats {
    let mut total_requests = 0u32;
    let mut total_failures = 0u32;
    let mut total_http_errors = 0u32;
    let mut samples: Vec<f64> = Vec::new();
    for m in members {
        total_requests += m.record.network.request_count;
        total_failures += m.record.network.request_failure_count;
        total_http_errors += m.record.network.http_error_count;
        samples.extend_from_slice(&m.record.network.response_times_ms);
    }
    NetworkStats {
        total_requests,
        total_failures,
        total_http_errors,
        failure_rate_pct: if total_requests > 0 {
            round2(total_failures as f64 / total_requests as f64 * 100.0)
        } else {
            0.0
        },
        avg_response_time_ms: round2(mean(&samples)),
        p95_response_time_ms: round2(percentile(&samples, 95.0)),
    }
}

/// Tests per minute over the set's wall-clock span when every member
/// carries a timestamp and the span is positive; otherwise over the sum
/// of individual durations. The fallback overestimates elapsed time for
/// overlapping execution, which is acceptable for sequential runs and
/// avoids a zero or negative denominator when timestamps are missing.
fn tests_per_minute(members: &[&EnrichedTestRecord]) -> f64 {
    if members.is_empty() {
        return 0.0;
    }
    let mut elapsed_ms = None;
    if members.iter().all(|m| m.record.started_at.is_some()) {
        let start = members.iter().filter_map(|m| m.record.started_at).min();
        let end = members.iter().filter_map(|m| m.record.ended_at()).max();
        if let (Some(start), Some(end)) = (start, end) {
            let span = (end - start).num_milliseconds() as f64;
            if span > 0.0 {
                elapsed_ms = Some(span);
            }
        }
    }
    let elapsed_ms =
        elapsed_ms.unwrap_or_else(|| members.iter().map(|m| m.record.duration_ms).sum());
    if elapsed_ms <= 0.0 {
        return 0.0;
    }
    round2(members.len() as f64 * 60_000.0 / elapsed_ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::core::{
        AccessibilityFinding, AccessibilitySummary, ErrorObservation, NetworkObservation,
        OutcomeClass, Severity,
    };

    fn record(id: &str, group: &str, duration_ms: f64, status: TestStatus) -> TestUnitRecord {
        TestUnitRecord {
            id: id.to_string(),
            title: format!("{group} > {id}"),
            file_path: "suite.spec.ts".to_string(),
            group_label: group.to_string(),
            attempt_number: 0,
            status,
            outcome_class: match status {
                TestStatus::Passed => OutcomeClass::Expected,
                TestStatus::Skipped => OutcomeClass::Skipped,
                _ => OutcomeClass::Unexpected,
            },
            started_at: None,
            duration_ms,
            network: NetworkObservation::default(),
            errors: ErrorObservation::default(),
            accessibility: AccessibilitySummary::default(),
        }
    }

    fn critical_findings(n: usize) -> AccessibilitySummary {
        AccessibilitySummary::from_findings(
            (0..n)
                .map(|i| AccessibilityFinding {
                    rule_id: format!("rule-{i}"),
                    severity: Severity::Critical,
                    description: "bad".to_string(),
                    help_reference: None,
                    affected_element_count: 1,
                })
                .collect(),
        )
    }

    #[test]
    fn test_enrich_clean_fast_pass_is_elite() {
        let enriched = enrich(record("t1", "chromium", 1000.0, TestStatus::Passed));
        assert_eq!(enriched.scores.duration, 100.0);
        assert_eq!(enriched.scores.reliability, 100.0);
        assert_eq!(enriched.scores.quality, 100.0);
        assert_eq!(enriched.scores.throughput, 100.0);
        assert_eq!(enriched.scores.accessibility, 100.0);
        assert_eq!(enriched.benchmark_score, 100.0);
        assert_eq!(enriched.tier, Tier::Elite);
    }

    #[test]
    fn test_enrich_slow_test_scores() {
        let enriched = enrich(record("t2", "chromium", 9000.0, TestStatus::Passed));
        assert_eq!(enriched.scores.duration, 0.0);
        // 60000/9000 = 6.67/min between the 4 and 30 anchors.
        assert_eq!(enriched.scores.throughput, 10.26);
        assert_eq!(enriched.benchmark_score, 56.03);
        assert_eq!(enriched.tier, Tier::Critical);
    }

    #[test]
    fn test_enrich_reliability_penalizes_retries() {
        let mut r = record("t3", "firefox", 1000.0, TestStatus::Passed);
        r.attempt_number = 2;
        let enriched = enrich(r);
        assert_eq!(enriched.scores.reliability, 70.0);

        let mut r = record("t4", "firefox", 1000.0, TestStatus::Failed);
        r.attempt_number = 1;
        // 15 - 15 = 0, clamped.
        assert_eq!(enrich(r).scores.reliability, 0.0);

        let skipped = record("t5", "firefox", 0.0, TestStatus::Skipped);
        assert_eq!(enrich(skipped).scores.reliability, 70.0);
    }

    #[test]
    fn test_group_duration_score_matches_fixture() {
        // Two chromium tests at 1000 and 9000 ms: mean 5000, nearest-rank
        // p95 = 9000, weighted duration score 36.36*0.6 + 7.69*0.4.
        let records = vec![
            record("a", "chromium", 1000.0, TestStatus::Passed),
            record("b", "chromium", 9000.0, TestStatus::Passed),
        ];
        let run = aggregate(records);
        let group = &run.groups[0];
        assert_eq!(group.label, "chromium");
        assert_eq!(group.duration.mean_ms, 5000.0);
        assert_eq!(group.duration.p95_ms, 9000.0);
        assert_eq!(group.scores.duration, 24.89);
        assert_eq!(group.scores.reliability, 100.0);
        // Sum-of-durations fallback: 2 tests in 10s -> 12/min.
        assert_eq!(group.tests_per_minute, 12.0);
        assert_eq!(group.scores.throughput, 30.77);
        assert_eq!(group.benchmark_score, 70.54);
        assert_eq!(group.tier, Tier::Stable);
    }

    #[test]
    fn test_group_composite_is_not_mean_of_member_composites() {
        // One slow-but-accessible test and one fast-but-inaccessible test:
        // the group recomputes from raw samples with its own weights, so
        // the composite must not collapse into the member average.
        let mut fast_inaccessible = record("a", "webkit", 800.0, TestStatus::Passed);
        fast_inaccessible.accessibility = critical_findings(3);
        let slow_accessible = record("b", "webkit", 8000.0, TestStatus::Passed);

        let run = aggregate(vec![fast_inaccessible, slow_accessible]);
        let group = &run.groups[0];
        let member_mean =
            run.tests.iter().map(|t| t.benchmark_score).sum::<f64>() / run.tests.len() as f64;
        assert!(
            (group.benchmark_score - member_mean).abs() > 0.5,
            "group {} vs member mean {}",
            group.benchmark_score,
            member_mean
        );
    }

    #[test]
    fn test_overall_composite_ignores_accessibility() {
        let clean = vec![
            record("a", "chromium", 1000.0, TestStatus::Passed),
            record("b", "chromium", 1000.0, TestStatus::Passed),
        ];
        let mut dirty = clean.clone();
        dirty[0].id = "a2".into();
        dirty[1].id = "b2".into();
        dirty[0].accessibility = critical_findings(5);
        dirty[1].accessibility = critical_findings(5);

        let clean_overall = aggregate(clean).overall;
        let dirty_overall = aggregate(dirty).overall;
        // The accessibility sub-score collapses but the run composite
        // holds: accessibility is reported separately at run level.
        assert_eq!(dirty_overall.scores.accessibility, 0.0);
        assert_eq!(clean_overall.benchmark_score, dirty_overall.benchmark_score);
    }

    #[test]
    fn test_dedupe_keeps_last_attempt_in_first_encounter_order() {
        let mut first = record("t1", "chromium", 1000.0, TestStatus::Failed);
        first.attempt_number = 0;
        let other = record("t2", "chromium", 500.0, TestStatus::Passed);
        let mut retry = record("t1", "chromium", 1100.0, TestStatus::Passed);
        retry.attempt_number = 1;

        let deduped = dedupe_last_attempt(vec![first, other, retry]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].id, "t1");
        assert_eq!(deduped[0].attempt_number, 1);
        assert_eq!(deduped[0].status, TestStatus::Passed);
        assert_eq!(deduped[1].id, "t2");
    }

    #[test]
    fn test_groups_sorted_by_score_tests_by_duration() {
        let records = vec![
            record("a", "webkit", 8000.0, TestStatus::Failed),
            record("b", "chromium", 900.0, TestStatus::Passed),
            record("c", "webkit", 7000.0, TestStatus::Failed),
            record("d", "chromium", 1200.0, TestStatus::Passed),
        ];
        let run = aggregate(records);
        assert_eq!(run.groups[0].label, "chromium");
        assert_eq!(run.groups[1].label, "webkit");
        assert!(run.groups[0].benchmark_score > run.groups[1].benchmark_score);
        let durations: Vec<f64> = run.tests.iter().map(|t| t.record.duration_ms).collect();
        assert_eq!(durations, vec![8000.0, 7000.0, 1200.0, 900.0]);
    }

    #[test]
    fn test_wall_clock_span_beats_duration_sum() {
        let base = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let mut a = record("a", "chromium", 1000.0, TestStatus::Passed);
        a.started_at = Some(base);
        let mut b = record("b", "chromium", 1000.0, TestStatus::Passed);
        // Starts 29 seconds in, ends at t=30s: span 30s for 2 tests.
        b.started_at = Some(base + chrono::Duration::seconds(29));

        let run = aggregate(vec![a, b]);
        assert_eq!(run.groups[0].tests_per_minute, 4.0);
    }

    #[test]
    fn test_empty_run_aggregates_to_zero_counts() {
        let run = aggregate(Vec::new());
        assert!(run.tests.is_empty());
        assert!(run.groups.is_empty());
        assert_eq!(run.overall.total_tests, 0);
        assert_eq!(run.overall.pass_rate_pct, 0.0);
        assert_eq!(run.overall.tests_per_minute, 0.0);
        assert_eq!(run.overall.duration.mean_ms, 0.0);
    }

    #[test]
    fn test_network_rollup_pools_samples() {
        let mut a = record("a", "chromium", 1000.0, TestStatus::Passed);
        a.network = NetworkObservation::new(4, 1, 1, vec![100.0, 200.0]);
        let mut b = record("b", "chromium", 1000.0, TestStatus::Passed);
        b.network = NetworkObservation::new(6, 0, 0, vec![300.0, 400.0]);

        let run = aggregate(vec![a, b]);
        let net = &run.groups[0].network;
        assert_eq!(net.total_requests, 10);
        assert_eq!(net.total_failures, 1);
        assert_eq!(net.failure_rate_pct, 10.0);
        assert_eq!(net.avg_response_time_ms, 250.0);
        assert_eq!(net.p95_response_time_ms, 400.0);
    }
}
