//! Comparable-sales search
//!
//! Narrows a pool of sold parcels with caller-side filters (distance, living
//! area band, land use), ranks the survivors by Gower distance to the subject
//! and keeps the closest `k`.

use crate::explain::{ComparableStats, ComparablesResponse, ExplainedResult};
use crate::rerank::{GowerRanker, RangeBasis, RankedResult};
use crate::schema::FieldSpec;
use compx_core::{CandidateFilter, Error, Filter, FilterCondition, GeoPoint, Record, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Filter and cut-off options for a comparable-sales search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompCriteria {
    /// Number of comparables to keep
    pub k: usize,
    /// Maximum great-circle distance in miles; 0 disables the filter
    pub max_distance_miles: f64,
    /// Maximum absolute living-area difference; 0 disables the filter
    pub living_area_band: f64,
    /// Require the subject's land use
    pub same_land_use: bool,
}

impl Default for CompCriteria {
    fn default() -> Self {
        Self {
            k: 10,
            max_distance_miles: 0.0,
            living_area_band: 0.0,
            same_land_use: false,
        }
    }
}

impl CompCriteria {
    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(Error::InvalidConfiguration("k must be at least 1".to_string()));
        }
        if !(self.max_distance_miles.is_finite() && self.max_distance_miles >= 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "max_distance_miles must be a non-negative number, got {}",
                self.max_distance_miles
            )));
        }
        if !(self.living_area_band.is_finite() && self.living_area_band >= 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "living_area_band must be a non-negative number, got {}",
                self.living_area_band
            )));
        }
        Ok(())
    }

    /// Build the candidate filter for `subject`
    pub fn build_filter(&self, subject: &dyn Record, keys: &CompKeys) -> CandidateFilter {
        let mut conditions = Vec::new();

        if self.max_distance_miles > 0.0 {
            conditions.push(FilterCondition::WithinMiles {
                origin: GeoPoint::from_record(subject, &keys.latitude, &keys.longitude),
                max_miles: self.max_distance_miles,
                lat_key: keys.latitude.clone(),
                lon_key: keys.longitude.clone(),
            });
        }
        if self.living_area_band > 0.0 {
            conditions.push(FilterCondition::WithinBand {
                field: keys.living_area.clone(),
                center: subject.number(&keys.living_area),
                band: self.living_area_band,
            });
        }
        if self.same_land_use {
            conditions.push(FilterCondition::SameCategory {
                field: keys.land_use.clone(),
                value: subject.category(&keys.land_use).map(|c| c.into_owned()),
            });
        }

        CandidateFilter::new(FilterCondition::And(conditions))
    }
}

/// Attribute names the filters read from subject and candidate records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompKeys {
    pub latitude: String,
    pub longitude: String,
    pub living_area: String,
    pub land_use: String,
}

impl Default for CompKeys {
    fn default() -> Self {
        Self {
            latitude: "lat".to_string(),
            longitude: "lon".to_string(),
            living_area: "finished_area".to_string(),
            land_use: "land_use".to_string(),
        }
    }
}

/// A ranked comparable with its distance from the subject in miles
#[derive(Debug, Clone)]
pub struct ComparableSale<'a, R> {
    pub ranked: RankedResult<'a, R>,
    pub distance_miles: Option<f64>,
}

/// Outcome of one search
#[derive(Debug, Clone)]
pub struct CompSearchOutcome<'a, R> {
    pub candidates_count: usize,
    pub filtered_count: usize,
    /// Closest comparables first, at most `k`
    pub comparables: Vec<ComparableSale<'a, R>>,
}

impl<'a, R> CompSearchOutcome<'a, R> {
    pub fn stats(&self) -> ComparableStats {
        ComparableStats::compute(&self.comparables, self.candidates_count, self.filtered_count)
    }

    pub fn into_response(self, include_items: bool) -> ComparablesResponse<'a, R> {
        let stats = self.stats();
        ComparablesResponse {
            result: ExplainedResult::from_comparable_list(self.comparables, include_items),
            stats,
        }
    }
}

/// Filter, rank and cut a candidate pool
#[derive(Debug, Clone)]
pub struct CompSearch {
    ranker: GowerRanker,
    criteria: CompCriteria,
    keys: CompKeys,
}

impl CompSearch {
    pub fn new(ranker: GowerRanker, criteria: CompCriteria, keys: CompKeys) -> Result<Self> {
        criteria.validate()?;
        Ok(Self { ranker, criteria, keys })
    }

    pub fn ranker(&self) -> &GowerRanker {
        &self.ranker
    }

    pub fn criteria(&self) -> &CompCriteria {
        &self.criteria
    }

    pub fn keys(&self) -> &CompKeys {
        &self.keys
    }

    pub fn run<'a, R: Record>(&self, subject: &dyn Record, candidates: &'a [R]) -> CompSearchOutcome<'a, R> {
        let filter = self.criteria.build_filter(subject, &self.keys);
        let selected: Vec<(usize, &'a R)> = candidates
            .iter()
            .enumerate()
            .filter(|(_, c)| filter.matches(*c))
            .collect();
        let filtered_count = selected.len();
        debug!(
            candidates = candidates.len(),
            filtered = filtered_count,
            "applied comparable filters"
        );

        let origin = GeoPoint::from_record(subject, &self.keys.latitude, &self.keys.longitude);
        let comparables: Vec<ComparableSale<'a, R>> = self
            .ranker
            .rank_indexed(subject, selected)
            .into_iter()
            .take(self.criteria.k)
            .map(|ranked| {
                let distance_miles = origin.zip(GeoPoint::from_record(
                    ranked.item,
                    &self.keys.latitude,
                    &self.keys.longitude,
                ))
                .map(|(a, b)| a.miles_to(&b));
                ComparableSale { ranked, distance_miles }
            })
            .collect();
        debug!(results = comparables.len(), k = self.criteria.k, "ranked comparables");

        CompSearchOutcome {
            candidates_count: candidates.len(),
            filtered_count,
            comparables,
        }
    }
}

/// A self-contained comparable-sales query, as read from JSON
#[derive(Debug, Clone, Deserialize)]
pub struct ComparablesRequest {
    pub subject: Value,
    pub candidates: Vec<Value>,
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub criteria: CompCriteria,
    #[serde(default)]
    pub keys: CompKeys,
    #[serde(default)]
    pub range_basis: RangeBasis,
}

impl ComparablesRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn search(&self) -> Result<CompSearch> {
        let ranker = GowerRanker::from_specs(self.fields.clone())?.with_range_basis(self.range_basis);
        CompSearch::new(ranker, self.criteria, self.keys.clone())
    }

    pub fn run(&self) -> Result<CompSearchOutcome<'_, Value>> {
        Ok(self.search()?.run(&self.subject, &self.candidates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ranker() -> GowerRanker {
        GowerRanker::from_specs(vec![
            FieldSpec::categorical("land_use", 1.0),
            FieldSpec::numeric("finished_area", 1.0),
            FieldSpec::numeric("year_built", 1.0),
        ])
        .unwrap()
    }

    fn subject() -> Value {
        json!({"land_use": "1010", "finished_area": 1500, "year_built": 1960, "lat": 40.0, "lon": -75.0})
    }

    fn pool() -> Vec<Value> {
        vec![
            json!({"id": "far", "land_use": "1010", "finished_area": 1500, "year_built": 1960, "lat": 41.0, "lon": -75.0}),
            json!({"id": "near", "land_use": "1010", "finished_area": 1550, "year_built": 1962, "lat": 40.01, "lon": -75.0}),
            json!({"id": "big", "land_use": "1010", "finished_area": 2600, "year_built": 1990, "lat": 40.02, "lon": -75.0}),
            json!({"id": "condo", "land_use": "1020", "finished_area": 1450, "year_built": 1961, "lat": 40.0, "lon": -75.01}),
            json!({"id": "nowhere", "land_use": "1010", "finished_area": 1500, "year_built": 1960}),
        ]
    }

    fn ids(outcome: &CompSearchOutcome<'_, Value>) -> Vec<String> {
        outcome
            .comparables
            .iter()
            .map(|c| c.ranked.item["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_no_filters_ranks_everything() {
        let search = CompSearch::new(ranker(), CompCriteria::default(), CompKeys::default()).unwrap();
        let candidates = pool();
        let outcome = search.run(&subject(), &candidates);

        assert_eq!(outcome.candidates_count, 5);
        assert_eq!(outcome.filtered_count, 5);
        assert_eq!(outcome.comparables.len(), 5);
        // "far" and "nowhere" are identical on every weighted field; input order breaks the tie
        assert_eq!(ids(&outcome)[..2], ["far".to_string(), "nowhere".to_string()]);
        assert_eq!(outcome.comparables[1].distance_miles, None);
    }

    #[test]
    fn test_distance_filter_excludes_unknown_locations() {
        let criteria = CompCriteria { max_distance_miles: 5.0, ..CompCriteria::default() };
        let search = CompSearch::new(ranker(), criteria, CompKeys::default()).unwrap();
        let candidates = pool();
        let outcome = search.run(&subject(), &candidates);

        let found = ids(&outcome);
        assert!(!found.contains(&"far".to_string()));
        assert!(!found.contains(&"nowhere".to_string()));
        assert_eq!(outcome.filtered_count, 3);
        assert!(outcome.comparables.iter().all(|c| c.distance_miles.unwrap() <= 5.0));
    }

    #[test]
    fn test_band_and_land_use_filters() {
        let criteria = CompCriteria {
            living_area_band: 200.0,
            same_land_use: true,
            ..CompCriteria::default()
        };
        let search = CompSearch::new(ranker(), criteria, CompKeys::default()).unwrap();
        let candidates = pool();
        let outcome = search.run(&subject(), &candidates);

        assert_eq!(ids(&outcome), vec!["far", "nowhere", "near"]);
    }

    #[test]
    fn test_k_truncates_and_keeps_original_index() {
        let criteria = CompCriteria { k: 1, max_distance_miles: 5.0, ..CompCriteria::default() };
        let search = CompSearch::new(ranker(), criteria, CompKeys::default()).unwrap();
        let candidates = pool();
        let outcome = search.run(&subject(), &candidates);

        assert_eq!(outcome.comparables.len(), 1);
        assert_eq!(ids(&outcome), vec!["near"]);
        assert_eq!(outcome.comparables[0].ranked.index, 1);
    }

    #[test]
    fn test_invalid_criteria() {
        let zero_k = CompCriteria { k: 0, ..CompCriteria::default() };
        assert!(matches!(
            CompSearch::new(ranker(), zero_k, CompKeys::default()),
            Err(Error::InvalidConfiguration(_))
        ));

        let negative = CompCriteria { max_distance_miles: -1.0, ..CompCriteria::default() };
        assert!(negative.validate().is_err());

        let nan_band = CompCriteria { living_area_band: f64::NAN, ..CompCriteria::default() };
        assert!(nan_band.validate().is_err());
    }

    #[test]
    fn test_custom_keys() {
        let keys = CompKeys {
            latitude: "latitude".to_string(),
            longitude: "longitude".to_string(),
            living_area: "sqft".to_string(),
            land_use: "luc".to_string(),
        };
        let criteria = CompCriteria { living_area_band: 100.0, ..CompCriteria::default() };
        let search = CompSearch::new(
            GowerRanker::from_specs(vec![FieldSpec::numeric("sqft", 1.0)]).unwrap(),
            criteria,
            keys,
        )
        .unwrap();

        let subject = json!({"sqft": 1000, "latitude": 40.0, "longitude": -75.0});
        let candidates = vec![
            json!({"sqft": 1090, "latitude": 40.0, "longitude": -75.0}),
            json!({"sqft": 1200}),
        ];
        let outcome = search.run(&subject, &candidates);
        assert_eq!(outcome.comparables.len(), 1);
        assert_eq!(outcome.comparables[0].distance_miles, Some(0.0));
    }

    #[test]
    fn test_request_from_json() {
        let request = ComparablesRequest::from_json(
            r#"{
                "subject": {"land_use": "1010", "district": "A", "finished_area": 1500},
                "candidates": [
                    {"land_use": "1020", "district": "B", "finished_area": 3000},
                    {"land_use": "1010", "district": "A", "finished_area": 1600}
                ],
                "fields": [
                    {"key": "land_use", "type": "categorical"},
                    {"key": "district", "type": "categorical"},
                    {"key": "finished_area", "type": "numeric"}
                ],
                "criteria": {"k": 1}
            }"#,
        )
        .unwrap();

        assert_eq!(request.criteria.k, 1);
        assert_eq!(request.keys, CompKeys::default());

        let outcome = request.run().unwrap();
        assert_eq!(outcome.comparables.len(), 1);
        assert_eq!(outcome.comparables[0].ranked.index, 1);

        let response = outcome.into_response(false);
        assert_eq!(response.stats.candidates_count, 2);
        assert_eq!(response.stats.top_contributing_field.as_deref(), Some("finished_area"));
    }

    #[test]
    fn test_request_with_zero_weights_is_rejected() {
        let request = ComparablesRequest::from_json(
            r#"{"subject": {}, "candidates": [], "fields": [{"key": "a", "type": "numeric", "weight": 0}]}"#,
        )
        .unwrap();
        assert!(matches!(request.run(), Err(Error::InvalidConfiguration(_))));

        let malformed = ComparablesRequest::from_json(r#"{"subject": {}}"#);
        assert!(matches!(malformed, Err(Error::Serialization(_))));
    }
}
