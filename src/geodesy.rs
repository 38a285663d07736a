//! # Spherical-earth geometry
//!
//! Great-circle distances, longitude wrapping and the lon/lat bounding box used by the
//! track filters, the land-sea mask crop and the CLI `--lonlat` option.
//!
//! All angles are in **degrees**, all distances in **kilometers**, on a sphere of radius
//! [`EARTH_RADIUS_KM`].
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, Kilometer, EARTH_RADIUS_KM},
    polarlows_errors::PolarLowsError,
};

/// Great-circle distance between two points using the haversine formula.
///
/// Arguments
/// ---------
/// * `lon1`, `lat1`: first point (degrees)
/// * `lon2`, `lat2`: second point (degrees)
///
/// Return
/// ----------
/// * the distance in kilometers on a sphere of radius 6371 km
#[inline]
pub fn great_circle_km(lon1: Degree, lat1: Degree, lon2: Degree, lat2: Degree) -> Kilometer {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());
    EARTH_RADIUS_KM * c
}

/// Map a longitude from `[0, 360)` (or any range) into `[-180, 180)`.
#[inline]
pub fn wrap_longitude(lon: Degree) -> Degree {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}

/// Rectangular lon/lat region `(lon0, lon1, lat0, lat1)`, inclusive on all four edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub lon0: Degree,
    pub lon1: Degree,
    pub lat0: Degree,
    pub lat1: Degree,
}

impl BoundingBox {
    /// Build a bounding box, checking that both ranges are ordered.
    pub fn new(lon0: Degree, lon1: Degree, lat0: Degree, lat1: Degree) -> Result<Self, PolarLowsError> {
        if !(lon0 <= lon1) || !(lat0 <= lat1) {
            return Err(PolarLowsError::InvalidParameter(format!(
                "bounding box must satisfy lon0 <= lon1 and lat0 <= lat1, got ({lon0}, {lon1}, {lat0}, {lat1})"
            )));
        }
        Ok(BoundingBox {
            lon0,
            lon1,
            lat0,
            lat1,
        })
    }

    #[inline]
    pub fn contains(&self, lon: Degree, lat: Degree) -> bool {
        lon >= self.lon0 && lon <= self.lon1 && lat >= self.lat0 && lat <= self.lat1
    }
}

impl Default for BoundingBox {
    /// Nordic Seas / Barents Sea domain of the polar-low study.
    fn default() -> Self {
        BoundingBox {
            lon0: -25.0,
            lon1: 55.0,
            lat0: 64.0,
            lat1: 86.0,
        }
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.lon0, self.lon1, self.lat0, self.lat1)
    }
}

impl FromStr for BoundingBox {
    type Err = PolarLowsError;

    /// Parse `"lon0,lon1,lat0,lat1"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PolarLowsError::InvalidParameter(format!("invalid bounding box '{s}': {e}")))?;

        match values.as_slice() {
            [lon0, lon1, lat0, lat1] => BoundingBox::new(*lon0, *lon1, *lat0, *lat1),
            _ => Err(PolarLowsError::InvalidParameter(format!(
                "bounding box needs 4 comma-separated values, got '{s}'"
            ))),
        }
    }
}
