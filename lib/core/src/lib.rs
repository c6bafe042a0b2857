//! # CompX Core
//!
//! Core library for the CompX comparable-sales engine.
//!
//! This crate provides the numeric building blocks shared by the similarity
//! engine and the ratio-study tooling:
//!
//! - [`Record`] - Read-only view over loosely typed parcel/sale rows
//! - [`haversine_miles`] / [`GeoPoint`] - Great-circle distance in miles
//! - [`trim_iqr`] / [`percentile`] - IQR outlier fences with R-7 percentiles
//! - [`compute_stats`] - n / median / average / min / max summaries
//! - [`build_histogram`] - Fixed-width, gap-free histogram buckets
//! - [`RatioStudy`] - Trim, summarize and bin in one call
//! - [`CandidateFilter`] - Distance, band and category filters over records
//! - [`CurrencyFormatter`] - Bounded, explicitly owned display cache
//!
//! ## Example
//!
//! ```rust
//! use compx_core::{trim_iqr, compute_stats, build_histogram, TrimFactor};
//!
//! let ratios = vec![0.91, 0.97, 1.02, 0.99, 1.05, 3.40];
//! let retained = trim_iqr(&ratios, Some(TrimFactor::Inner));
//! assert_eq!(retained.len(), 5);
//!
//! let summary = compute_stats(&retained).unwrap();
//! assert_eq!(summary.n, 5);
//! assert_eq!(summary.median, 0.99);
//!
//! let buckets = build_histogram(&retained, 0.1);
//! assert_eq!(buckets.iter().map(|b| b.count).sum::<usize>(), 5);
//! ```

pub mod error;
pub mod record;
pub mod geo;
pub mod stats;
pub mod histogram;
pub mod ratio;
pub mod filter;
pub mod cache;

pub use error::{Error, Result};
pub use record::{Record, numeric_value, categorical_value};
pub use geo::{GeoPoint, haversine_miles, EARTH_RADIUS_MILES};
pub use stats::{NumericSummary, TrimFactor, compute_stats, percentile, sorted_finite, trim_iqr};
pub use histogram::{HistogramBucket, build_histogram, histogram_bucket_count, DEFAULT_BIN_WIDTH, MAX_HISTOGRAM_BUCKETS};
pub use ratio::{RatioStudy, RatioStudyReport};
pub use filter::{Filter, CandidateFilter, FilterCondition};
pub use cache::{BoundedCache, CurrencyFormatter};
