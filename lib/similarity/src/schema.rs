//! Field specifications
//!
//! Declares which attributes take part in a comparison, how each one is
//! compared, and how much it counts toward the aggregate Gower distance.

use compx_core::Error;
use serde::{Deserialize, Serialize};

/// How a field is compared
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Range-normalized absolute difference
    Numeric,
    /// Exact label match
    Categorical,
}

/// One attribute participating in similarity comparison
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldSpec {
    /// Attribute name looked up in each record
    pub key: String,

    #[serde(rename = "type")]
    pub field_type: FieldType,

    /// Scale of this field's contribution; 0 keeps the field out of the total
    #[serde(default = "default_weight")]
    pub weight: f64,
}

fn default_weight() -> f64 {
    1.0
}

impl FieldSpec {
    pub fn numeric(key: impl Into<String>, weight: f64) -> Self {
        Self {
            key: key.into(),
            field_type: FieldType::Numeric,
            weight,
        }
    }

    pub fn categorical(key: impl Into<String>, weight: f64) -> Self {
        Self {
            key: key.into(),
            field_type: FieldType::Categorical,
            weight,
        }
    }

    /// Whether this field counts toward the aggregate distance
    pub fn is_weighted(&self) -> bool {
        self.weight > 0.0
    }
}

/// A validated, ordered list of field specifications
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(transparent)]
pub struct FieldSet {
    fields: Vec<FieldSpec>,
}

impl FieldSet {
    /// Validate a field list.
    ///
    /// - The list must not be empty
    /// - Weights must be finite and non-negative
    /// - Weights must sum to a finite number greater than zero
    pub fn new(fields: Vec<FieldSpec>) -> Result<Self, SchemaError> {
        if fields.is_empty() {
            return Err(SchemaError::EmptySchema);
        }

        for field in &fields {
            if !field.weight.is_finite() {
                return Err(SchemaError::NonFiniteWeight(field.key.clone()));
            }
            if field.weight < 0.0 {
                return Err(SchemaError::NegativeWeight(field.key.clone()));
            }
        }

        let weight_sum: f64 = fields.iter().map(|f| f.weight).sum();
        if !weight_sum.is_finite() {
            return Err(SchemaError::TotalWeightOverflow);
        }
        if weight_sum <= 0.0 {
            return Err(SchemaError::ZeroTotalWeight);
        }

        Ok(Self { fields })
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Sum of all weights; always positive for a validated set
    pub fn total_weight(&self) -> f64 {
        self.fields.iter().filter(|f| f.is_weighted()).map(|f| f.weight).sum()
    }

    pub fn get_field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn into_inner(self) -> Vec<FieldSpec> {
        self.fields
    }
}

/// Errors that can occur during field validation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Field list cannot be empty")]
    EmptySchema,

    #[error("Field '{0}' has negative weight")]
    NegativeWeight(String),

    #[error("Field '{0}' has a non-finite weight")]
    NonFiniteWeight(String),

    #[error("Total weight must be greater than zero")]
    ZeroTotalWeight,

    #[error("Total weight is too large to represent")]
    TotalWeightOverflow,
}

impl From<SchemaError> for Error {
    fn from(err: SchemaError) -> Self {
        Error::InvalidConfiguration(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_set_creation() {
        let set = FieldSet::new(vec![
            FieldSpec::categorical("land_use", 1.0),
            FieldSpec::numeric("finished_area", 2.0),
            FieldSpec::numeric("year_built", 0.0),
        ])
        .unwrap();

        assert_eq!(set.len(), 3);
        assert_eq!(set.total_weight(), 3.0);
        assert_eq!(set.get_field("finished_area").unwrap().field_type, FieldType::Numeric);
        assert!(!set.get_field("year_built").unwrap().is_weighted());
    }

    #[test]
    fn test_empty_field_set_error() {
        assert_eq!(FieldSet::new(vec![]), Err(SchemaError::EmptySchema));
    }

    #[test]
    fn test_zero_total_weight_error() {
        let result = FieldSet::new(vec![
            FieldSpec::categorical("land_use", 0.0),
            FieldSpec::numeric("finished_area", 0.0),
        ]);
        assert_eq!(result, Err(SchemaError::ZeroTotalWeight));
    }

    #[test]
    fn test_negative_weight_error() {
        let result = FieldSet::new(vec![
            FieldSpec::categorical("land_use", 1.0),
            FieldSpec::numeric("finished_area", -0.5),
        ]);
        assert!(matches!(result, Err(SchemaError::NegativeWeight(ref k)) if k == "finished_area"));
    }

    #[test]
    fn test_non_finite_weight_error() {
        let result = FieldSet::new(vec![FieldSpec::numeric("finished_area", f64::NAN)]);
        assert!(matches!(result, Err(SchemaError::NonFiniteWeight(_))));
    }

    #[test]
    fn test_total_weight_overflow_error() {
        let result = FieldSet::new(vec![
            FieldSpec::categorical("land_use", 1e308),
            FieldSpec::categorical("district", 1e308),
        ]);
        assert_eq!(result, Err(SchemaError::TotalWeightOverflow));
    }

    #[test]
    fn test_schema_error_maps_to_invalid_configuration() {
        let err: Error = SchemaError::ZeroTotalWeight.into();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn test_field_spec_json() {
        let json = r#"[
            {"key": "land_use", "type": "categorical"},
            {"key": "finished_area", "type": "numeric", "weight": 2.5}
        ]"#;
        let specs: Vec<FieldSpec> = serde_json::from_str(json).unwrap();
        assert_eq!(specs[0].weight, 1.0);
        assert_eq!(specs[1].weight, 2.5);

        let set = FieldSet::new(specs).unwrap();
        let out = serde_json::to_string(&set).unwrap();
        assert!(out.starts_with('['));
        assert!(out.contains("\"type\":\"categorical\""));
    }

    #[test]
    fn test_unknown_field_type_is_rejected() {
        let json = r#"[{"key": "land_use", "type": "boolean"}]"#;
        assert!(serde_json::from_str::<Vec<FieldSpec>>(json).is_err());
    }
}
