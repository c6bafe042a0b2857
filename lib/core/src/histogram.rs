//! Fixed-width histogram binning for ratio charts

use crate::stats::sorted_finite;
use serde::{Deserialize, Serialize};

/// Decimal places kept when stepping bucket boundaries
const BOUNDARY_DECIMALS: i32 = 10;

/// Default bin width used by the ratio-study explorer
pub const DEFAULT_BIN_WIDTH: f64 = 0.1;

/// Largest histogram a ratio study will build before refusing the input
pub const MAX_HISTOGRAM_BUCKETS: usize = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HistogramBucket {
    pub bin_start: f64,
    pub count: usize,
}

/// Round to the fixed boundary precision so repeated additions of a
/// fractional width do not drift.
fn round_boundary(x: f64) -> f64 {
    let scale = 10f64.powi(BOUNDARY_DECIMALS);
    (x * scale).round() / scale
}

/// First and last bucket boundaries for sorted finite values
fn bucket_bounds(sorted: &[f64], bin_width: f64) -> Option<(f64, f64)> {
    if !(bin_width.is_finite() && round_boundary(bin_width) > 0.0) {
        return None;
    }
    let (min, max) = (*sorted.first()?, *sorted.last()?);
    Some((
        round_boundary((min / bin_width).floor() * bin_width),
        round_boundary((max / bin_width).ceil() * bin_width),
    ))
}

/// Number of buckets [`build_histogram`] produces for `values`, without
/// allocating them. Saturates at `usize::MAX`.
pub fn histogram_bucket_count(values: &[f64], bin_width: f64) -> usize {
    let sorted = sorted_finite(values);
    match bucket_bounds(&sorted, bin_width) {
        Some((start, end)) => {
            let steps = ((end - start) / bin_width).round();
            if steps.is_finite() {
                (steps as usize).saturating_add(1)
            } else {
                usize::MAX
            }
        }
        None => 0,
    }
}

/// Bin `values` into contiguous buckets of `bin_width`.
///
/// Buckets run from `floor(min / w) * w` to `ceil(max / w) * w` inclusive,
/// zero-count buckets included. Each value lands in bucket
/// `floor((v - start) / w)`, clamped to the bucket range. Empty input, or a
/// width that does not survive rounding to ten decimals as a positive
/// number, yields no buckets.
///
/// The bucket count is not capped: a wide value range with a narrow width
/// allocates one bucket per step. Check [`histogram_bucket_count`] first
/// when the input is untrusted.
pub fn build_histogram(values: &[f64], bin_width: f64) -> Vec<HistogramBucket> {
    let sorted = sorted_finite(values);
    let Some((start, end)) = bucket_bounds(&sorted, bin_width) else {
        return Vec::new();
    };

    let mut buckets = Vec::new();
    let mut edge = start;
    while edge <= end {
        buckets.push(HistogramBucket { bin_start: edge, count: 0 });
        let next = round_boundary(edge + bin_width);
        if next <= edge {
            break;
        }
        edge = next;
    }

    let Some(last) = buckets.len().checked_sub(1) else {
        return buckets;
    };
    for v in &sorted {
        let idx = ((v - start) / bin_width).floor();
        let idx = if idx <= 0.0 { 0 } else { (idx as usize).min(last) };
        buckets[idx].count += 1;
    }

    buckets
}
