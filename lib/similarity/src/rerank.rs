//! Gower ranking
//!
//! Scores every candidate against a subject record and orders candidates
//! from most to least similar, keeping per-field contributions for
//! explanation.

use crate::distance::{categorical_contribution, numeric_contribution, FieldRanges};
use crate::schema::{FieldSet, FieldSpec, FieldType};
use compx_core::{Record, Result};
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Which records define each numeric field's range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RangeBasis {
    /// Candidates plus the subject
    #[default]
    CandidatesAndSubject,
    /// Candidates only; contributions are capped at 1.0
    CandidatesOnly,
}

/// One field's share of a pairwise distance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldContribution {
    pub key: String,
    /// Unweighted dissimilarity in [0.0, 1.0]
    pub contribution: f64,
    pub weight: f64,
}

impl FieldContribution {
    pub fn weighted(&self) -> f64 {
        self.contribution * self.weight
    }
}

/// A candidate with its aggregate Gower distance to the subject
#[derive(Debug, Clone, Serialize)]
pub struct RankedResult<'a, R> {
    /// The candidate record
    pub item: &'a R,
    /// Position of the candidate in the caller's input
    pub index: usize,
    /// Weighted mean dissimilarity; 0.0 means identical on every weighted field
    pub distance: f64,
    pub contributions: Vec<FieldContribution>,
}

impl<'a, R> RankedResult<'a, R> {
    /// Field adding the most weighted dissimilarity, if any field differs
    pub fn top_contributing_field(&self) -> Option<&str> {
        self.contributions
            .iter()
            .filter(|c| c.weighted() > 0.0)
            .max_by_key(|c| OrderedFloat(c.weighted()))
            .map(|c| c.key.as_str())
    }
}

/// Ranker that computes weighted Gower distances
#[derive(Debug, Clone)]
pub struct GowerRanker {
    fields: FieldSet,
    range_basis: RangeBasis,
}

impl GowerRanker {
    /// Create a new ranker over a validated field set
    pub fn new(fields: FieldSet) -> Self {
        Self {
            fields,
            range_basis: RangeBasis::default(),
        }
    }

    /// Validate `specs` and build a ranker
    pub fn from_specs(specs: Vec<FieldSpec>) -> Result<Self> {
        Ok(Self::new(FieldSet::new(specs)?))
    }

    pub fn with_range_basis(mut self, range_basis: RangeBasis) -> Self {
        self.range_basis = range_basis;
        self
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    pub fn range_basis(&self) -> RangeBasis {
        self.range_basis
    }

    /// Numeric ranges for one ranking call
    pub fn ranges<'a, R, I>(&self, subject: &dyn Record, candidates: I) -> FieldRanges
    where
        R: Record + 'a,
        I: IntoIterator<Item = &'a R> + Clone,
    {
        let mut ranges = FieldRanges::compute(&self.fields, candidates);
        if self.range_basis == RangeBasis::CandidatesAndSubject {
            ranges.include(&self.fields, subject);
        }
        ranges
    }

    /// Score one candidate against the subject using precomputed ranges.
    ///
    /// Returns the aggregate distance and every field's contribution,
    /// including zero-weight fields.
    pub fn score(
        &self,
        subject: &dyn Record,
        candidate: &dyn Record,
        ranges: &FieldRanges,
    ) -> (f64, Vec<FieldContribution>) {
        let mut contributions = Vec::with_capacity(self.fields.len());
        let mut weighted_sum = 0.0;

        for (i, field) in self.fields.fields().iter().enumerate() {
            let contribution = match field.field_type {
                FieldType::Numeric => numeric_contribution(
                    subject.number(&field.key),
                    candidate.number(&field.key),
                    ranges.get(i),
                ),
                FieldType::Categorical => categorical_contribution(
                    subject.category(&field.key).as_deref(),
                    candidate.category(&field.key).as_deref(),
                ),
            };

            if field.is_weighted() {
                weighted_sum += field.weight * contribution;
            }
            contributions.push(FieldContribution {
                key: field.key.clone(),
                contribution,
                weight: field.weight,
            });
        }

        (weighted_sum / self.fields.total_weight(), contributions)
    }

    /// Rank candidates by ascending distance to the subject.
    ///
    /// Ties keep input order.
    pub fn rank<'a, R: Record>(
        &self,
        subject: &dyn Record,
        candidates: &'a [R],
    ) -> Vec<RankedResult<'a, R>> {
        self.rank_indexed(subject, candidates.iter().enumerate())
    }

    /// Rank a pre-filtered selection, reporting each candidate's original index
    pub fn rank_indexed<'a, R, I>(&self, subject: &dyn Record, candidates: I) -> Vec<RankedResult<'a, R>>
    where
        R: Record + 'a,
        I: IntoIterator<Item = (usize, &'a R)>,
    {
        let pool: Vec<(usize, &'a R)> = candidates.into_iter().collect();
        let ranges = self.ranges(subject, pool.iter().map(|(_, r)| *r));

        let mut results: Vec<RankedResult<'a, R>> = pool
            .into_iter()
            .map(|(index, item)| {
                let (distance, contributions) = self.score(subject, item, &ranges);
                RankedResult { item, index, distance, contributions }
            })
            .collect();

        // Stable: equal distances stay in input order
        results.sort_by_key(|r| OrderedFloat(r.distance));
        results
    }

    /// Create a new ranker with custom weight overrides
    ///
    /// Overrides replace weights for matching keys; unknown keys are ignored
    /// and negative weights are clamped to zero. The result is re-validated,
    /// so zeroing every weight is an error.
    pub fn with_weights(&self, weight_overrides: &HashMap<String, f64>) -> Result<GowerRanker> {
        let specs = self
            .fields
            .fields()
            .iter()
            .map(|field| {
                let mut field = field.clone();
                if let Some(weight) = weight_overrides.get(&field.key) {
                    field.weight = weight.max(0.0);
                }
                field
            })
            .collect();

        Ok(GowerRanker::from_specs(specs)?.with_range_basis(self.range_basis))
    }
}

/// Rank `candidates` against `subject` by weighted Gower distance.
///
/// Fails with [`compx_core::Error::InvalidConfiguration`] when `fields` is
/// empty or its weights do not sum to a positive number.
pub fn compute_distances<'a, R: Record>(
    subject: &dyn Record,
    candidates: &'a [R],
    fields: &[FieldSpec],
) -> Result<Vec<RankedResult<'a, R>>> {
    let ranker = GowerRanker::from_specs(fields.to_vec())?;
    Ok(ranker.rank(subject, candidates))
}
