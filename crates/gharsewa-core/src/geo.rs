//! Coordinates and great-circle distance.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Mean Earth radius used for haversine distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Build a point without range checks.
    ///
    /// Ranking accepts whatever it is given; validate at ingestion time with
    /// [`GeoPoint::try_new`] or [`GeoPoint::validate`].
    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point, rejecting non-finite or out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] when latitude is outside
    /// `[-90, 90]` or longitude is outside `[-180, 180]`.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        let point = Self::new(latitude, longitude);
        point.validate()?;
        Ok(point)
    }

    /// Check that both coordinates are finite and within range.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinate`] on any violation.
    pub fn validate(&self) -> Result<(), CoreError> {
        let lat_ok = self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lon_ok = self.longitude.is_finite() && (-180.0..=180.0).contains(&self.longitude);
        if lat_ok && lon_ok {
            Ok(())
        } else {
            Err(CoreError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }

    /// A point exists only when both parts are known.
    ///
    /// `0.0` is a real coordinate (equator / prime meridian) and is kept.
    #[must_use]
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => Some(Self::new(lat, lon)),
            _ => None,
        }
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    ///
    /// A non-finite coordinate on either side yields `f64::INFINITY`, never NaN.
    #[must_use]
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2)
            + self.latitude.to_radians().cos()
                * other.latitude.to_radians().cos()
                * (d_lon / 2.0).sin().powi(2);
        // Rounding can push `a` a hair past 1.0 for antipodal points.
        let a = a.clamp(0.0, 1.0);
        if a.is_nan() {
            return f64::INFINITY;
        }
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}
