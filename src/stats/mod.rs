//! Numeric helpers shared by the scoring and aggregation stages.
//!
//! Every function here is total over its numeric domain: empty samples
//! degrade to 0 rather than erroring, so downstream math never has to
//! special-case missing data.

/// Arithmetic mean. Returns 0 for an empty sample.
pub fn mean(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Nearest-rank percentile: sort ascending, take the value at index
/// `ceil(p/100 * n) - 1`, clamped into `[0, n-1]`.
///
/// This is a discrete percentile, not an interpolated one. Report
/// fixtures depend on the exact rule, e.g. `percentile(&[10,20,30,40], 95)`
/// lands on index `ceil(3.8) - 1 = 3` and returns 40.
pub fn percentile(xs: &[f64], p: f64) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    let rank = (p / 100.0 * n as f64).ceil() as isize - 1;
    let idx = rank.clamp(0, n as isize - 1) as usize;
    sorted[idx]
}

/// Population standard deviation (divides by n). Returns 0 for an empty
/// sample.
pub fn std_dev(xs: &[f64]) -> f64 {
    if xs.is_empty() {
        return 0.0;
    }
    let m = mean(xs);
    let variance = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64;
    variance.sqrt()
}

/// Half-up decimal rounding via power-of-ten scaling.
pub fn round_to(x: f64, digits: u32) -> f64 {
    let factor = 10f64.powi(digits as i32);
    (x * factor).round() / factor
}

/// `round_to` with the 2-digit default used throughout the report payload.
pub fn round2(x: f64) -> f64 {
    round_to(x, 2)
}

pub fn clamp(x: f64, lo: f64, hi: f64) -> f64 {
    x.max(lo).min(hi)
}
