//! Per-field Gower dissimilarity
//!
//! Every function returns a contribution in [0.0, 1.0] where 0.0 means
//! identical. Degenerate inputs resolve to documented fallbacks instead of
//! errors: a missing value or a zero-width range costs nothing.

use crate::schema::{FieldSet, FieldType};
use compx_core::Record;

/// Observed minimum and maximum of a numeric field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

impl NumericRange {
    /// Fold finite values into a range; `None` if there are none
    pub fn observe<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<NumericRange>, v| match acc {
                None => Some(NumericRange { min: v, max: v }),
                Some(r) => Some(NumericRange {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// `|a - b| / range`, or 0.0 when either side is missing or the range is
/// empty, zero-width or non-finite.
pub fn numeric_contribution(a: Option<f64>, b: Option<f64>, range: Option<NumericRange>) -> f64 {
    let (Some(a), Some(b), Some(range)) = (a, b, range) else {
        return 0.0;
    };
    let span = range.span();
    if !(span.is_finite() && span > 0.0) {
        return 0.0;
    }
    ((a - b).abs() / span).min(1.0)
}

/// 0.0 for equal labels, 1.0 otherwise.
///
/// `None` is the unknown category: it matches another unknown and nothing
/// else.
pub fn categorical_contribution(a: Option<&str>, b: Option<&str>) -> f64 {
    if a == b {
        0.0
    } else {
        1.0
    }
}

/// Per-field numeric ranges, aligned with the field order of a [`FieldSet`].
///
/// Categorical fields carry `None`. Computed once per ranking call.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRanges {
    ranges: Vec<Option<NumericRange>>,
}

impl FieldRanges {
    /// Observe each numeric field over `records`
    pub fn compute<'a, R, I>(fields: &FieldSet, records: I) -> Self
    where
        R: Record + 'a,
        I: IntoIterator<Item = &'a R> + Clone,
    {
        let ranges = fields
            .fields()
            .iter()
            .map(|field| match field.field_type {
                FieldType::Numeric => NumericRange::observe(
                    records.clone().into_iter().filter_map(|r| r.number(&field.key)),
                ),
                FieldType::Categorical => None,
            })
            .collect();

        Self { ranges }
    }

    /// Widen every numeric range to cover `record`
    pub fn include(&mut self, fields: &FieldSet, record: &dyn Record) {
        for (range, field) in self.ranges.iter_mut().zip(fields.fields()) {
            if field.field_type != FieldType::Numeric {
                continue;
            }
            if let Some(v) = record.number(&field.key) {
                *range = Some(match *range {
                    Some(r) => NumericRange { min: r.min.min(v), max: r.max.max(v) },
                    None => NumericRange { min: v, max: v },
                });
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<NumericRange> {
        self.ranges.get(index).copied().flatten()
    }
}
