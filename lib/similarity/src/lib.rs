//! # CompX Similarity
//!
//! A field-driven similarity engine for parcel records.
//!
//! This crate ranks candidate sales against a subject property by weighted
//! Gower distance, with explainable per-field results.
//!
//! ## Features
//!
//! - **Field Specifications**: Declarative list of the attributes that matter and their weights
//! - **Gower Ranking**: Mixed numeric and categorical dissimilarity in one score
//! - **Comparable Search**: Distance, living-area and land-use filters before ranking
//! - **Explainability**: Per-field contribution breakdown for transparency
//!
//! ## Example
//!
//! ```rust
//! use compx_similarity::{compute_distances, FieldSpec};
//! use serde_json::json;
//!
//! let fields = vec![
//!     FieldSpec::categorical("land_use", 1.0),
//!     FieldSpec::numeric("finished_area", 1.0),
//! ];
//!
//! let subject = json!({"land_use": "1010", "finished_area": 1500});
//! let candidates = vec![
//!     json!({"land_use": "1020", "finished_area": 3000}),
//!     json!({"land_use": "1010", "finished_area": 1600}),
//! ];
//!
//! let ranked = compute_distances(&subject, &candidates, &fields).unwrap();
//! assert_eq!(ranked[0].index, 1);
//! assert_eq!(ranked[1].distance, 1.0);
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Fields    │────>│   Filters   │────>│   Ranker    │
//! │ (weights)   │     │ (criteria)  │     │  (Gower)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                         ┌─────────────┐
//!                                         │  Explain    │
//!                                         │  (results)  │
//!                                         └─────────────┘
//! ```

pub mod schema;
pub mod distance;
pub mod rerank;
pub mod explain;
pub mod comps;

// Re-export main types for convenience
pub use schema::{FieldSet, FieldSpec, FieldType, SchemaError};
pub use distance::{categorical_contribution, numeric_contribution, FieldRanges, NumericRange};
pub use rerank::{compute_distances, FieldContribution, GowerRanker, RangeBasis, RankedResult};
pub use explain::{ComparableStats, ComparablesResponse, ExplainedResult};
pub use comps::{
    ComparableSale,
    ComparablesRequest,
    CompCriteria,
    CompKeys,
    CompSearch,
    CompSearchOutcome,
};
