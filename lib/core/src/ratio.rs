//! Ratio study: trim, summarize and bin assessment-to-sale ratios

use crate::error::{Error, Result};
use crate::histogram::{build_histogram, histogram_bucket_count, HistogramBucket, DEFAULT_BIN_WIDTH};
use crate::stats::{compute_stats, trim_iqr, NumericSummary, TrimFactor};
use serde::{Deserialize, Serialize};

/// Options for a ratio study run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioStudy {
    /// Outlier fence; `None` keeps every value
    #[serde(default)]
    pub trim: Option<TrimFactor>,
    #[serde(default = "default_bin_width")]
    pub bin_width: f64,
}

fn default_bin_width() -> f64 {
    DEFAULT_BIN_WIDTH
}

impl Default for RatioStudy {
    fn default() -> Self {
        Self {
            trim: None,
            bin_width: DEFAULT_BIN_WIDTH,
        }
    }
}

/// Result of a ratio study
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatioStudyReport {
    /// Number of values supplied
    pub input_count: usize,
    /// Number of values removed by the fence (non-finite values included)
    pub trimmed_count: usize,
    pub trim: Option<TrimFactor>,
    pub bin_width: f64,
    /// Summary over retained values, `None` when nothing is retained
    pub summary: Option<NumericSummary>,
    pub histogram: Vec<HistogramBucket>,
}

impl RatioStudy {
    pub fn new(trim: Option<TrimFactor>, bin_width: f64) -> Self {
        Self { trim, bin_width }
    }

    pub fn run(&self, ratios: &[f64]) -> RatioStudyReport {
        let retained = trim_iqr(ratios, self.trim);
        self.report(ratios, retained)
    }

    /// Like [`RatioStudy::run`], but refuse inputs whose histogram would need
    /// more than `max_buckets` buckets
    pub fn try_run(&self, ratios: &[f64], max_buckets: usize) -> Result<RatioStudyReport> {
        let retained = trim_iqr(ratios, self.trim);
        let buckets = histogram_bucket_count(&retained, self.bin_width);
        if buckets > max_buckets {
            return Err(Error::InvalidConfiguration(format!(
                "histogram would need {} buckets at width {}, limit is {}",
                buckets, self.bin_width, max_buckets
            )));
        }
        Ok(self.report(ratios, retained))
    }

    fn report(&self, ratios: &[f64], retained: Vec<f64>) -> RatioStudyReport {
        RatioStudyReport {
            input_count: ratios.len(),
            trimmed_count: ratios.len() - retained.len(),
            trim: self.trim,
            bin_width: self.bin_width,
            summary: compute_stats(&retained),
            histogram: build_histogram(&retained, self.bin_width),
        }
    }
}
