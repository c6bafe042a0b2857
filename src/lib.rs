//! # CompX
//!
//! Comparable-sales selection and ratio studies for property assessment.
//!
//! CompX ranks sold parcels against a subject property by weighted Gower
//! distance and summarizes assessment-to-sale ratio collections with IQR
//! trimming, order statistics and fixed-width histograms.
//!
//! ## Quick Start
//!
//! ### From the Command Line
//!
//! ```bash
//! compx comps --input request.json --k 5 --max-distance-miles 1.5 --format table
//! compx ratio-study --input ratios.json --trim 1.5 --bin-width 0.05
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use compx::prelude::*;
//! use serde_json::json;
//!
//! let ranker = GowerRanker::from_specs(vec![
//!     FieldSpec::categorical("land_use", 1.0),
//!     FieldSpec::numeric("finished_area", 2.0),
//! ])
//! .unwrap();
//! let criteria = CompCriteria { k: 2, living_area_band: 500.0, ..Default::default() };
//! let search = CompSearch::new(ranker, criteria, CompKeys::default()).unwrap();
//!
//! let subject = json!({"land_use": "1010", "finished_area": 1500});
//! let pool = vec![
//!     json!({"land_use": "1010", "finished_area": 2600}),
//!     json!({"land_use": "1010", "finished_area": 1550}),
//!     json!({"land_use": "1020", "finished_area": 1480}),
//! ];
//!
//! let outcome = search.run(&subject, &pool);
//! assert_eq!(outcome.filtered_count, 2);
//! assert_eq!(outcome.comparables[0].ranked.index, 1);
//!
//! let report = RatioStudy::new(Some(TrimFactor::Inner), 0.1).run(&[0.95, 1.0, 1.05, 4.0]);
//! assert_eq!(report.trimmed_count, 1);
//! ```
//!
//! ## Crate Structure
//!
//! CompX is composed of two library crates:
//!
//! - [`compx-core`](https://docs.rs/compx-core) - Records, geodesy, statistics, histograms, filters
//! - [`compx-similarity`](https://docs.rs/compx-similarity) - Gower ranking and comparable search

// Re-export core types
pub use compx_core::{
    Record, GeoPoint, haversine_miles,
    NumericSummary, TrimFactor, compute_stats, percentile, trim_iqr,
    HistogramBucket, build_histogram,
    RatioStudy, RatioStudyReport,
    Filter, CandidateFilter, FilterCondition,
    CurrencyFormatter,
    Error, Result,
};

// Re-export similarity
pub use compx_similarity::{
    FieldSpec, FieldType, FieldSet,
    GowerRanker, RankedResult, RangeBasis, FieldContribution, compute_distances,
    CompCriteria, CompKeys, CompSearch, CompSearchOutcome, ComparableSale, ComparablesRequest,
    ComparablesResponse, ComparableStats, ExplainedResult,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Record, GeoPoint, haversine_miles,
        TrimFactor, compute_stats, trim_iqr, build_histogram,
        RatioStudy, RatioStudyReport,
        FieldSpec, FieldType, GowerRanker, RangeBasis, compute_distances,
        CompCriteria, CompKeys, CompSearch, ComparablesRequest,
        Error, Result,
    };
}
