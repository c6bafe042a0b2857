//! Great-circle distance between parcels
//!
//! Distance is a filter and display concern: it never enters the Gower score
//! unless a caller adds latitude/longitude as numeric fields explicitly.

use crate::record::Record;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in statute miles
pub const EARTH_RADIUS_MILES: f64 = 3958.8;

/// A validated latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        let valid = lat.is_finite()
            && lon.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lon);
        valid.then_some(Self { lat, lon })
    }

    /// Read a point from a record's latitude and longitude attributes
    pub fn from_record(record: &dyn Record, lat_key: &str, lon_key: &str) -> Option<Self> {
        Self::new(record.number(lat_key)?, record.number(lon_key)?)
    }

    /// Haversine distance to another point in miles
    pub fn miles_to(&self, other: &GeoPoint) -> f64 {
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        // Clamp guards asin against a hair over 1.0 for antipodal points
        let c = 2.0 * a.sqrt().min(1.0).asin();
        EARTH_RADIUS_MILES * c
    }
}

/// Great-circle distance in miles between two coordinate pairs.
///
/// Returns `None` when any coordinate is non-finite or outside
/// lat ∈ [-90, 90], lon ∈ [-180, 180]. Callers treat `None` as
/// "cannot compare" rather than as a failure.
pub fn haversine_miles(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> Option<f64> {
    let a = GeoPoint::new(lat1, lon1)?;
    let b = GeoPoint::new(lat2, lon2)?;
    Some(a.miles_to(&b))
}
