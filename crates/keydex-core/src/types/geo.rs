//! Geographic points, distances, and great-circle math for the geo index.

use crate::error::Error;
use derive_more::Display;
use serde::{Deserialize, Serialize};

///
/// Constants
///

/// Earth radius used for haversine distance, in meters.
/// Matches the radius Redis uses for its GEO commands.
pub const EARTH_RADIUS_METERS: f64 = 6_372_797.560_856;

pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;
pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;

///
/// GeoPoint
///
/// A 2D coordinate, longitude first.
/// Ranges are checked when a point is written or used as a query center.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, PartialEq, Serialize)]
#[display("({longitude}, {latitude})")]
pub struct GeoPoint {
    longitude: f64,
    latitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&self.longitude)
            && (MIN_LATITUDE..=MAX_LATITUDE).contains(&self.latitude)
    }

    /// Reject coordinates outside the standard ranges (NaN included).
    pub fn validate(&self) -> Result<(), Error> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::InvalidGeoCoordinate {
                longitude: self.longitude,
                latitude: self.latitude,
            })
        }
    }

    /// Great-circle distance to `other`, in meters.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let half_dlat = (lat2 - lat1) / 2.0;
        let half_dlon = (other.longitude - self.longitude).to_radians() / 2.0;

        let a = lat1
            .cos()
            .mul_add(lat2.cos() * half_dlon.sin().powi(2), half_dlat.sin().powi(2));

        2.0 * EARTH_RADIUS_METERS * a.sqrt().min(1.0).asin()
    }
}

///
/// Metric
///
/// Distance unit. Conversion factors are fixed and relative to meters.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Display, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    #[display("m")]
    Meters,
    #[display("km")]
    Kilometers,
    #[display("mi")]
    Miles,
    #[display("ft")]
    Feet,
}

impl Metric {
    #[must_use]
    pub const fn meters_per_unit(self) -> f64 {
        match self {
            Self::Meters => 1.0,
            Self::Kilometers => 1000.0,
            Self::Miles => 1609.34,
            Self::Feet => 0.3048,
        }
    }
}

///
/// Distance
///

#[derive(Clone, Copy, Debug, Deserialize, Display, PartialEq, Serialize)]
#[display("{value}{metric}")]
pub struct Distance {
    pub value: f64,
    pub metric: Metric,
}

impl Distance {
    #[must_use]
    pub const fn new(value: f64, metric: Metric) -> Self {
        Self { value, metric }
    }

    #[must_use]
    pub const fn meters(value: f64) -> Self {
        Self::new(value, Metric::Meters)
    }

    #[must_use]
    pub const fn kilometers(value: f64) -> Self {
        Self::new(value, Metric::Kilometers)
    }

    #[must_use]
    pub const fn miles(value: f64) -> Self {
        Self::new(value, Metric::Miles)
    }

    /// Canonical length in meters.
    #[must_use]
    pub fn to_meters(&self) -> f64 {
        self.value * self.metric.meters_per_unit()
    }

    /// Express a length given in meters in `metric`.
    #[must_use]
    pub fn from_meters(meters: f64, metric: Metric) -> Self {
        Self::new(meters / metric.meters_per_unit(), metric)
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.value.is_finite() && self.value >= 0.0
    }
}

///
/// TESTS
///
