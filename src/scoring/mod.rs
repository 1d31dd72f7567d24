//! Scoring primitives: the two linear score curves, the tier classifier,
//! the accessibility penalty curve, and the three composite weight sets.
//!
//! All functions are pure and total. Out-of-range input is clamped by
//! the formulas themselves; nothing here errors.

use serde::{Deserialize, Serialize};

use crate::core::AccessibilityTotals;
use crate::stats::{clamp, round2};

/// Score a metric where smaller is better (durations, error counts).
///
/// 100 at or below `target`, 0 at or above `max`, linear in between.
pub fn score_lower_better(value: f64, target: f64, max: f64) -> f64 {
    if value <= target {
        return 100.0;
    }
    if value >= max {
        return 0.0;
    }
    round2(clamp((1.0 - (value - target) / (max - target)) * 100.0, 0.0, 100.0))
}

/// Score a metric where larger is better (throughput).
///
/// 0 at or below `min`, 100 at or above `target`, linear in between.
pub fn score_higher_better(value: f64, min: f64, target: f64) -> f64 {
    if value >= target {
        return 100.0;
    }
    if value <= min {
        return 0.0;
    }
    round2(clamp((value - min) / (target - min) * 100.0, 0.0, 100.0))
}

/// Banded classification of a 0-100 composite score. Bands are inclusive
/// on their lower bound and partition the whole range with no gaps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Elite,
    Strong,
    Stable,
    Watch,
    Critical,
}

impl Tier {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Self::Elite
        } else if score >= 75.0 {
            Self::Strong
        } else if score >= 60.0 {
            Self::Stable
        } else if score >= 40.0 {
            Self::Watch
        } else {
            Self::Critical
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Elite => "Elite",
            Self::Strong => "Strong",
            Self::Stable => "Stable",
            Self::Watch => "Watch",
            Self::Critical => "Critical",
        }
    }
}

/// Accessibility sub-score from severity counts.
///
/// Penalty weights findings 4/3/2/1 from critical down to minor, and the
/// x8 multiplier makes the curve steep on purpose: three critical
/// findings already land in the Critical band. Downstream tier
/// thresholds were tuned against this exact coefficient.
pub fn accessibility_score(totals: &AccessibilityTotals) -> f64 {
    let penalty = totals.critical as f64 * 4.0
        + totals.serious as f64 * 3.0
        + totals.moderate as f64 * 2.0
        + totals.minor as f64;
    clamp(100.0 - penalty * 8.0, 0.0, 100.0)
}

/// The five sub-scores feeding a composite, each on a 0-100 scale.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubScores {
    pub duration: f64,
    pub reliability: f64,
    pub quality: f64,
    pub throughput: f64,
    pub accessibility: f64,
}

/// Weights for folding five sub-scores into one composite.
///
/// Three distinct sets exist by design: per-test, per-group, and whole
/// run each emphasize different factors, and the asymmetry encodes real
/// intent (a single slow test matters less at group granularity than
/// consistent accessibility debt). Do not unify them.
#[derive(Debug, Clone, Copy)]
pub struct CompositeWeights {
    pub duration: f64,
    pub reliability: f64,
    pub quality: f64,
    pub throughput: f64,
    pub accessibility: f64,
}

impl CompositeWeights {
    /// Weighted composite of the sub-scores, rounded to 2 digits.
    pub fn composite(&self, scores: &SubScores) -> f64 {
        round2(
            scores.duration * self.duration
                + scores.reliability * self.reliability
                + scores.quality * self.quality
                + scores.throughput * self.throughput
                + scores.accessibility * self.accessibility,
        )
    }
}

/// Weights applied to each individual test record.
pub const TEST_WEIGHTS: CompositeWeights = CompositeWeights {
    duration: 0.35,
    reliability: 0.25,
    quality: 0.15,
    throughput: 0.10,
    accessibility: 0.15,
};

/// Weights applied to per-group rollups. Accessibility counts for more
/// and duration for less than at test granularity.
pub const GROUP_WEIGHTS: CompositeWeights = CompositeWeights {
    duration: 0.30,
    reliability: 0.25,
    quality: 0.15,
    throughput: 0.10,
    accessibility: 0.20,
};

/// Weights applied to the whole-run summary. Accessibility is reported
/// separately at run level and deliberately excluded from the composite.
pub const RUN_WEIGHTS: CompositeWeights = CompositeWeights {
    duration: 0.40,
    reliability: 0.30,
    quality: 0.20,
    throughput: 0.10,
    accessibility: 0.0,
};
