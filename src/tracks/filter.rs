//! # Lifetime and bounding-box filters
//!
//! [`TrackFilter`] keeps the tracks whose lifetime reaches a minimum and, optionally, which
//! spend a minimum fraction of their fixes inside a bounding box. It is used on the
//! observational catalogues before matching and works on anything that exposes a
//! [`Track`] through [`AsRef`]. Filtering is order-preserving.
use crate::{
    constants::{Hours, DEFAULT_BBOX_COVERAGE, DEFAULT_MIN_LIFETIME_H},
    geodesy::BoundingBox,
};

use super::Track;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackFilter {
    pub min_lifetime_h: Hours,
    pub bbox: Option<BoundingBox>,
    pub coverage_threshold: f64,
}

impl Default for TrackFilter {
    fn default() -> Self {
        TrackFilter {
            min_lifetime_h: DEFAULT_MIN_LIFETIME_H,
            bbox: None,
            coverage_threshold: DEFAULT_BBOX_COVERAGE,
        }
    }
}

impl TrackFilter {
    pub fn new(min_lifetime_h: Hours, bbox: Option<BoundingBox>, coverage_threshold: f64) -> Self {
        TrackFilter {
            min_lifetime_h,
            bbox,
            coverage_threshold,
        }
    }

    /// `true` if `track` passes the lifetime and (if any) bounding-box tests.
    pub fn accepts(&self, track: &Track) -> bool {
        if track.lifetime_h() < self.min_lifetime_h {
            return false;
        }
        match &self.bbox {
            Some(bbox) => track.within_rectangle(bbox, self.coverage_threshold),
            None => true,
        }
    }

    /// Keep the accepted tracks, preserving their order.
    pub fn filter<T: AsRef<Track>>(&self, tracks: impl IntoIterator<Item = T>) -> Vec<T> {
        tracks
            .into_iter()
            .filter(|t| self.accepts(t.as_ref()))
            .collect()
    }
}
