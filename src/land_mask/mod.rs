//! # Land-sea mask
//!
//! A binary field on a regular (longitude, latitude) grid, `0` for sea and `1` for land,
//! used by the categorisation to reject tracks passing too close to land.
//!
//! ## Overview
//! -----------------
//! * [`LandSeaMask::from_grid`] – Build a mask from raw coordinates and values: optional
//!   longitude shift from `[0, 360)` to `[-180, 180)`, optional inclusive crop to a
//!   [`BoundingBox`], and binarisation (every non-zero value becomes `1`).
//! * [`LandSeaMask::land_fraction`] – Fraction of land cells within a great-circle radius of
//!   a point.
//! * [`netcdf_reader::load`] – Read `lsm.nc` files (requires the `netcdf` feature).
//!
//! ## Invariants
//! -----------------
//! * longitudes and latitudes are strictly ascending,
//! * values are in `{0, 1}`,
//! * the mask is never mutated after construction.
use crate::{
    constants::{Degree, Kilometer, EARTH_RADIUS_KM},
    geodesy::{great_circle_km, wrap_longitude, BoundingBox},
    polarlows_errors::PolarLowsError,
};

pub mod netcdf_reader;

#[derive(Debug, Clone, PartialEq)]
pub struct LandSeaMask {
    lon: Vec<Degree>,
    lat: Vec<Degree>,
    /// Row-major `[lat][lon]`.
    values: Vec<u8>,
}

/// Indices that sort `coords` ascending, dropping duplicated coordinates (first one wins).
fn ascending_order(coords: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..coords.len()).collect();
    order.sort_by(|&a, &b| coords[a].total_cmp(&coords[b]).then(a.cmp(&b)));
    order.dedup_by(|b, a| coords[*a] == coords[*b]);
    order
}

impl LandSeaMask {
    /// Build a mask from gridded values.
    ///
    /// Arguments
    /// -----------------
    /// * `lon`, `lat` – 1-D coordinates (degrees), in any order.
    /// * `values` – Row-major field `[lat][lon]` of size `lat.len() * lon.len()`.
    /// * `shift` – Remap longitudes with `((lon + 180) mod 360) - 180` before sorting.
    /// * `bbox` – Optional inclusive crop.
    ///
    /// Return
    /// ----------
    /// * The binarised mask with ascending coordinates, or
    ///   [`PolarLowsError::MaskReadError`] if the sizes disagree or a coordinate is not finite.
    pub fn from_grid(
        lon: Vec<Degree>,
        lat: Vec<Degree>,
        values: Vec<f64>,
        shift: bool,
        bbox: Option<&BoundingBox>,
    ) -> Result<Self, PolarLowsError> {
        if lon.is_empty() || lat.is_empty() {
            return Err(PolarLowsError::MaskReadError(
                "longitude and latitude axes must not be empty".into(),
            ));
        }
        if values.len() != lon.len() * lat.len() {
            return Err(PolarLowsError::MaskReadError(format!(
                "field has {} values, expected {} x {}",
                values.len(),
                lat.len(),
                lon.len()
            )));
        }
        if lon.iter().chain(&lat).any(|c| !c.is_finite()) {
            return Err(PolarLowsError::MaskReadError(
                "coordinates must be finite".into(),
            ));
        }

        let lon: Vec<Degree> = if shift {
            lon.into_iter().map(wrap_longitude).collect()
        } else {
            lon
        };

        let keep = |c: f64, lo: f64, hi: f64| c >= lo && c <= hi;
        let lon_order: Vec<usize> = ascending_order(&lon)
            .into_iter()
            .filter(|&i| bbox.map_or(true, |b| keep(lon[i], b.lon0, b.lon1)))
            .collect();
        let lat_order: Vec<usize> = ascending_order(&lat)
            .into_iter()
            .filter(|&j| bbox.map_or(true, |b| keep(lat[j], b.lat0, b.lat1)))
            .collect();

        let n_lon_in = lon.len();
        let values = lat_order
            .iter()
            .flat_map(|&j| {
                let values = &values;
                lon_order
                    .iter()
                    .map(move |&i| u8::from(values[j * n_lon_in + i] != 0.0))
            })
            .collect();

        Ok(LandSeaMask {
            lon: lon_order.iter().map(|&i| lon[i]).collect(),
            lat: lat_order.iter().map(|&j| lat[j]).collect(),
            values,
        })
    }

    #[inline]
    pub fn lon(&self) -> &[Degree] {
        &self.lon
    }

    #[inline]
    pub fn lat(&self) -> &[Degree] {
        &self.lat
    }

    #[inline]
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// `(n_lat, n_lon)`
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.lat.len(), self.lon.len())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline]
    pub fn get(&self, i_lat: usize, i_lon: usize) -> Option<u8> {
        if i_lat < self.lat.len() && i_lon < self.lon.len() {
            Some(self.values[i_lat * self.lon.len() + i_lon])
        } else {
            None
        }
    }

    /// Fraction of mask cells within `rad_km` of `(lon, lat)` that are land.
    ///
    /// Only the cells of the native grid are sampled. A point whose neighbourhood contains no
    /// grid cell (outside the mask envelope) has a land fraction of `0` (all sea).
    pub fn land_fraction(&self, lon: Degree, lat: Degree, rad_km: Kilometer) -> f64 {
        let rad_deg = (rad_km / EARTH_RADIUS_KM).to_degrees();
        let row_start = self.lat.partition_point(|&y| y < lat - rad_deg);
        let row_end = self.lat.partition_point(|&y| y <= lat + rad_deg);

        let mut n_within = 0usize;
        let mut n_land = 0usize;
        for j in row_start..row_end {
            let row = &self.values[j * self.lon.len()..(j + 1) * self.lon.len()];
            for (&x, &v) in self.lon.iter().zip(row) {
                if great_circle_km(lon, lat, x, self.lat[j]) <= rad_km {
                    n_within += 1;
                    n_land += usize::from(v == 1);
                }
            }
        }

        if n_within == 0 {
            0.0
        } else {
            n_land as f64 / n_within as f64
        }
    }
}
