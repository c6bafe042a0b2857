//! Open attribute records
//!
//! Parcels, sales and candidates arrive from the query layer as loosely typed
//! rows. The [`Record`] trait gives the engine a uniform, read-only view over
//! them and defines how raw values are coerced to numbers and categories.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::HashMap;
use std::hash::BuildHasher;

/// A read-only mapping from attribute name to JSON value.
///
/// Keys that cannot be resolved are reported as `None` and treated as
/// missing values by every consumer; they never produce errors.
pub trait Record {
    /// Raw value stored under `key`
    fn attribute(&self, key: &str) -> Option<&Value>;

    /// Value under `key` coerced to a finite number
    fn number(&self, key: &str) -> Option<f64> {
        self.attribute(key).and_then(numeric_value)
    }

    /// Value under `key` coerced to a category label, `None` for unknown
    fn category(&self, key: &str) -> Option<Cow<'_, str>> {
        self.attribute(key).and_then(categorical_value)
    }
}

impl Record for Value {
    fn attribute(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }
}

impl Record for Map<String, Value> {
    fn attribute(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl<S: BuildHasher> Record for HashMap<String, Value, S> {
    fn attribute(&self, key: &str) -> Option<&Value> {
        self.get(key)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn attribute(&self, key: &str) -> Option<&Value> {
        (**self).attribute(key)
    }
}

/// Coerce a JSON value to a finite number.
///
/// Numeric strings are accepted because numeric columns frequently come back
/// from the database as text. Non-finite results count as missing.
pub fn numeric_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerce a JSON value to a category label.
///
/// Matching on labels is exact and case-sensitive. `null` is the unknown
/// category and maps to `None`. Numbers use their shortest decimal form, so
/// `1010` and `1010.0` give the same label.
pub fn categorical_value(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Bool(b) => Some(Cow::Borrowed(if *b { "true" } else { "false" })),
        Value::Number(n) => Some(Cow::Owned(match n.as_f64() {
            Some(f) if n.is_f64() && f.is_finite() => format!("{}", f),
            _ => n.to_string(),
        })),
        other => Some(Cow::Owned(other.to_string())),
    }
}
