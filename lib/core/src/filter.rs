// Candidate filters applied before similarity ranking
use crate::geo::GeoPoint;
use crate::record::Record;

pub trait Filter {
    fn matches(&self, record: &dyn Record) -> bool;
}

pub struct CandidateFilter {
    condition: FilterCondition,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// Great-circle distance from `origin` is at most `max_miles`.
    /// An unknown origin or candidate location never matches.
    WithinMiles {
        origin: Option<GeoPoint>,
        max_miles: f64,
        lat_key: String,
        lon_key: String,
    },
    /// `|record[field] - center| <= band`; missing values never match
    WithinBand {
        field: String,
        center: Option<f64>,
        band: f64,
    },
    /// Category label equals `value` (unknown matches unknown only)
    SameCategory {
        field: String,
        value: Option<String>,
    },
    And(Vec<FilterCondition>),
    Not(Box<FilterCondition>),
}

impl CandidateFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    /// A filter that accepts everything
    pub fn accept_all() -> Self {
        Self::new(FilterCondition::And(Vec::new()))
    }

    pub fn condition(&self) -> &FilterCondition {
        &self.condition
    }

    fn matches_condition(condition: &FilterCondition, record: &dyn Record) -> bool {
        match condition {
            FilterCondition::WithinMiles { origin, max_miles, lat_key, lon_key } => {
                let here = GeoPoint::from_record(record, lat_key, lon_key);
                match (origin, here) {
                    (Some(origin), Some(here)) => origin.miles_to(&here) <= *max_miles,
                    _ => false,
                }
            }
            FilterCondition::WithinBand { field, center, band } => {
                match (center, record.number(field)) {
                    (Some(center), Some(v)) => (v - center).abs() <= *band,
                    _ => false,
                }
            }
            FilterCondition::SameCategory { field, value } => {
                record.category(field).as_deref() == value.as_deref()
            }
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, record))
            }
            FilterCondition::Not(condition) => {
                !Self::matches_condition(condition, record)
            }
        }
    }
}

impl Filter for CandidateFilter {
    fn matches(&self, record: &dyn Record) -> bool {
        Self::matches_condition(&self.condition, record)
    }
}
