//! Ratio-study statistics
//!
//! Continuous (R-7) percentiles, IQR outlier fences and summary statistics.
//! Every function takes a borrowed slice and returns fresh data; inputs are
//! never reordered in place. Non-finite values are dropped on entry.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// IQR fence multiplier used when trimming outliers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrimFactor {
    /// Tukey inner fence, 1.5 × IQR
    Inner,
    /// Tukey outer fence, 3 × IQR
    Outer,
}

impl TrimFactor {
    pub fn multiplier(self) -> f64 {
        match self {
            TrimFactor::Inner => 1.5,
            TrimFactor::Outer => 3.0,
        }
    }

    /// Map a raw multiplier back to a fence; only 1.5 and 3 are recognized
    pub fn from_multiplier(multiplier: f64) -> Option<Self> {
        if multiplier == 1.5 {
            Some(TrimFactor::Inner)
        } else if multiplier == 3.0 {
            Some(TrimFactor::Outer)
        } else {
            None
        }
    }
}

impl fmt::Display for TrimFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.multiplier())
    }
}

impl FromStr for TrimFactor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<f64>()
            .ok()
            .and_then(TrimFactor::from_multiplier)
            .ok_or_else(|| format!("unsupported trim factor '{}', expected 1.5 or 3", s))
    }
}

// Serialized as the bare multiplier so requests can say `"trim": 1.5`
impl Serialize for TrimFactor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.multiplier())
    }
}

impl<'de> Deserialize<'de> for TrimFactor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = f64::deserialize(deserializer)?;
        TrimFactor::from_multiplier(raw).ok_or_else(|| {
            serde::de::Error::custom(format!("unsupported trim factor {}, expected 1.5 or 3", raw))
        })
    }
}

/// Summary of a numeric collection
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub n: usize,
    pub median: f64,
    pub average: f64,
    pub min: f64,
    pub max: f64,
}

/// Finite values of `values`, sorted ascending
pub fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    sorted.sort_by_key(|v| OrderedFloat(*v));
    sorted
}

/// Continuous percentile of an ascending slice (R-7, linear interpolation).
///
/// `p <= 0` yields the first element and `p >= 1` the last. An empty slice
/// has no percentile.
pub fn percentile(sorted: &[f64], p: f64) -> Option<f64> {
    let (first, last) = (*sorted.first()?, *sorted.last()?);
    if p <= 0.0 {
        return Some(first);
    }
    if p >= 1.0 {
        return Some(last);
    }

    let idx = (sorted.len() - 1) as f64 * p;
    let lo = idx.floor() as usize;
    let hi = idx.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let (a, b, frac) = (sorted[lo], sorted[hi], idx - lo as f64);
    let gap = b - a;
    if gap.is_finite() {
        Some(a + gap * frac)
    } else {
        // Endpoints far enough apart to overflow the difference
        Some(a * (1.0 - frac) + b * frac)
    }
}

/// Remove values outside `[Q1 - k·IQR, Q3 + k·IQR]`.
///
/// With no factor the input is returned sorted and otherwise untouched.
/// The fence is inclusive, so a single value always survives.
pub fn trim_iqr(values: &[f64], factor: Option<TrimFactor>) -> Vec<f64> {
    let sorted = sorted_finite(values);
    let Some(factor) = factor else {
        return sorted;
    };
    let (Some(q1), Some(q3)) = (percentile(&sorted, 0.25), percentile(&sorted, 0.75)) else {
        return sorted;
    };

    let iqr = q3 - q1;
    let k = factor.multiplier();
    let (low, high) = (q1 - k * iqr, q3 + k * iqr);

    sorted.into_iter().filter(|v| *v >= low && *v <= high).collect()
}

/// Median, average, min and max of a collection.
///
/// Returns `None` for an empty (or entirely non-finite) collection so callers
/// never see NaN fields.
pub fn compute_stats(values: &[f64]) -> Option<NumericSummary> {
    let sorted = sorted_finite(values);
    let median = percentile(&sorted, 0.5)?;
    let n = sorted.len();
    let sum = sorted.iter().sum::<f64>();
    let average = if sum.is_finite() {
        sum / n as f64
    } else {
        sorted.iter().map(|v| v / n as f64).sum()
    };

    Some(NumericSummary {
        n,
        median,
        average,
        min: sorted[0],
        max: sorted[n - 1],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentile_fixtures() {
        let s = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&s, 0.25), Some(1.75));
        assert_eq!(percentile(&s, 0.5), Some(2.5));
        assert_eq!(percentile(&s, 0.75), Some(3.25));
        assert_eq!(percentile(&[5.0], 0.5), Some(5.0));
    }

    #[test]
    fn test_percentile_bounds() {
        let s = [1.0, 2.0, 3.0];
        assert_eq!(percentile(&s, 0.0), Some(1.0));
        assert_eq!(percentile(&s, -0.3), Some(1.0));
        assert_eq!(percentile(&s, 1.0), Some(3.0));
        assert_eq!(percentile(&s, 7.0), Some(3.0));
        assert_eq!(percentile(&s, 0.5), Some(2.0));
    }

    #[test]
    fn test_percentile_empty() {
        assert_eq!(percentile(&[], 0.5), None);
        assert_eq!(percentile(&[], 0.0), None);
        assert_eq!(percentile(&[], 1.0), None);
    }

    #[test]
    fn test_trim_without_factor_sorts_only() {
        let values = [3.0, 100.0, 1.0, 2.0];
        assert_eq!(trim_iqr(&values, None), vec![1.0, 2.0, 3.0, 100.0]);
    }

    #[test]
    fn test_trim_inner_fence_drops_outlier() {
        // Q1 = 2, Q3 = 4, IQR = 2 -> fence [-1, 7]
        let values = [1.0, 2.0, 3.0, 4.0, 100.0];
        assert_eq!(trim_iqr(&values, Some(TrimFactor::Inner)), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_trim_outer_fence_is_wider() {
        // Q1 = 2, Q3 = 4, IQR = 2: inner fence [-1, 7], outer fence [-4, 10]
        let values = [1.0, 2.0, 3.0, 4.0, 9.0];
        assert_eq!(trim_iqr(&values, Some(TrimFactor::Inner)), vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            trim_iqr(&values, Some(TrimFactor::Outer)),
            vec![1.0, 2.0, 3.0, 4.0, 9.0]
        );
    }

    #[test]
    fn test_trim_fence_is_inclusive() {
        // Q1 = 2, Q3 = 4, IQR = 2 -> inner fence upper bound exactly 7
        let values = [1.0, 2.0, 3.0, 4.0, 7.0];
        assert_eq!(trim_iqr(&values, Some(TrimFactor::Inner)), vec![1.0, 2.0, 3.0, 4.0, 7.0]);
    }

    #[test]
    fn test_trim_degenerate_inputs() {
        assert!(trim_iqr(&[], Some(TrimFactor::Inner)).is_empty());
        assert!(trim_iqr(&[], None).is_empty());
        assert_eq!(trim_iqr(&[0.93], Some(TrimFactor::Inner)), vec![0.93]);
        assert_eq!(trim_iqr(&[1.0, 1.0, 1.0], Some(TrimFactor::Outer)), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_trim_drops_non_finite() {
        let values = [f64::NAN, 2.0, f64::INFINITY, 1.0];
        assert_eq!(trim_iqr(&values, None), vec![1.0, 2.0]);
    }

    #[test]
    fn test_trim_does_not_mutate_input() {
        let values = vec![3.0, 1.0, 2.0];
        let _ = trim_iqr(&values, Some(TrimFactor::Inner));
        assert_eq!(values, vec![3.0, 1.0, 2.0]);
    }

    #[test]
    fn test_compute_stats() {
        let summary = compute_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(summary.n, 4);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.average, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
    }

    #[test]
    fn test_compute_stats_odd_count() {
        let summary = compute_stats(&[0.9, 1.1, 0.95]).unwrap();
        assert_eq!(summary.n, 3);
        assert_eq!(summary.median, 0.95);
        assert_eq!(summary.min, 0.9);
        assert_eq!(summary.max, 1.1);
        assert!((summary.average - 0.983_333_333).abs() < 1e-6);
    }

    #[test]
    fn test_compute_stats_extreme_values() {
        let summary = compute_stats(&[-1e308, 1e308]).unwrap();
        assert_eq!(summary.median, 0.0);
        assert_eq!(summary.average, 0.0);
        assert!(summary.min <= summary.median && summary.median <= summary.max);

        let q = percentile(&[-1e308, 1e308], 0.25).unwrap();
        assert!(q.is_finite() && q < 0.0);
    }

    #[test]
    fn test_compute_stats_empty() {
        assert!(compute_stats(&[]).is_none());
        assert!(compute_stats(&[f64::NAN]).is_none());
    }

    #[test]
    fn test_trim_factor_parsing() {
        assert_eq!("1.5".parse::<TrimFactor>(), Ok(TrimFactor::Inner));
        assert_eq!("3".parse::<TrimFactor>(), Ok(TrimFactor::Outer));
        assert!("2".parse::<TrimFactor>().is_err());
        assert_eq!(TrimFactor::Inner.to_string(), "1.5");
    }

    #[test]
    fn test_trim_factor_serde() {
        let parsed: Option<TrimFactor> = serde_json::from_str("3").unwrap();
        assert_eq!(parsed, Some(TrimFactor::Outer));
        let none: Option<TrimFactor> = serde_json::from_str("null").unwrap();
        assert_eq!(none, None);
        assert!(serde_json::from_str::<TrimFactor>("2.0").is_err());
        assert_eq!(serde_json::to_string(&TrimFactor::Inner).unwrap(), "1.5");
    }
}
