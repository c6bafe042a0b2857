//! Explainability for comparable-sales results
//!
//! Output structures that show how each distance was computed, with
//! per-field contributions for transparency.

use crate::comps::ComparableSale;
use crate::rerank::FieldContribution;
use serde::Serialize;

/// A comparable with its per-field distance breakdown
#[derive(Debug, Clone, Serialize)]
pub struct ExplainedResult<'a, R> {
    /// Position of the candidate in the request
    pub index: usize,
    /// Aggregate Gower distance
    pub distance: f64,
    /// Great-circle distance from the subject, when both locations are known
    pub distance_miles: Option<f64>,
    /// Field adding the most weighted dissimilarity
    pub top_contributing_field: Option<String>,
    /// Candidate record
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<&'a R>,
    /// Per-field contributions
    pub explain: Vec<FieldContribution>,
}

impl<'a, R> ExplainedResult<'a, R> {
    /// Create an explained result from a comparable sale
    pub fn from_comparable(sale: ComparableSale<'a, R>, include_item: bool) -> Self {
        let top_contributing_field = sale.ranked.top_contributing_field().map(str::to_string);
        Self {
            index: sale.ranked.index,
            distance: sale.ranked.distance,
            distance_miles: sale.distance_miles,
            top_contributing_field,
            item: include_item.then_some(sale.ranked.item),
            explain: sale.ranked.contributions,
        }
    }

    /// Create a list of explained results from comparable sales
    pub fn from_comparable_list(sales: Vec<ComparableSale<'a, R>>, include_item: bool) -> Vec<Self> {
        sales
            .into_iter()
            .map(|s| Self::from_comparable(s, include_item))
            .collect()
    }
}

/// Summary statistics for a comparable-sales query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparableStats {
    /// Number of candidates supplied
    pub candidates_count: usize,
    /// Number of candidates left after filtering
    pub filtered_count: usize,
    /// Number of results returned
    pub results_count: usize,
    /// Average distance of returned results
    pub avg_distance: Option<f64>,
    /// Distance of the closest result
    pub best_distance: Option<f64>,
    /// Field adding the most distance to the closest result
    pub top_contributing_field: Option<String>,
}

impl ComparableStats {
    /// Compute stats from ranked comparables (closest first)
    pub fn compute<R>(results: &[ComparableSale<'_, R>], candidates_count: usize, filtered_count: usize) -> Self {
        let Some(best) = results.first() else {
            return Self {
                candidates_count,
                filtered_count,
                results_count: 0,
                avg_distance: None,
                best_distance: None,
                top_contributing_field: None,
            };
        };

        let avg_distance = results.iter().map(|r| r.ranked.distance).sum::<f64>() / results.len() as f64;

        Self {
            candidates_count,
            filtered_count,
            results_count: results.len(),
            avg_distance: Some(avg_distance),
            best_distance: Some(best.ranked.distance),
            top_contributing_field: best.ranked.top_contributing_field().map(str::to_string),
        }
    }
}

/// Response structure for a comparable-sales query
#[derive(Debug, Clone, Serialize)]
pub struct ComparablesResponse<'a, R> {
    /// Comparables with explanations, closest first
    pub result: Vec<ExplainedResult<'a, R>>,
    pub stats: ComparableStats,
}
