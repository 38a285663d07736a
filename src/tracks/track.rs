//! # Single cyclone track
//!
//! A [`Track`] is a validated, time-ordered sequence of [`Fix`]es with a stable index inside
//! its [`TrackRun`](crate::tracks::TrackRun) and a list of classification labels.
//!
//! Derived attributes
//! -----------------
//! * [`Track::lifetime_h`] – hours between the first and the last fix,
//! * [`Track::gen_lys_dist_km`] – great-circle distance between genesis and lysis,
//! * [`Track::len`] – number of fixes,
//! * [`Track::speeds_km_per_step`] – instantaneous propagation speed at each fix,
//! * [`Track::bbox_coverage`] – fraction of fixes inside a bounding box.
use crate::{
    constants::{Categories, Fixes, Hours, Kilometer, TrackIdx},
    geodesy::{great_circle_km, BoundingBox},
    polarlows_errors::PolarLowsError,
    time::{hours_between, unix_minutes},
};

use super::Fix;

#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    idx: TrackIdx,
    fixes: Fixes,
    categories: Categories,
}

/// Check the track invariants: at least one fix, strictly increasing timestamps.
fn check_fixes(fixes: &[Fix]) -> Result<(), String> {
    if fixes.is_empty() {
        return Err("a track needs at least one fix".into());
    }
    for (i, pair) in fixes.windows(2).enumerate() {
        if unix_minutes(&pair[1].time) <= unix_minutes(&pair[0].time) {
            return Err(format!(
                "timestamps are not strictly increasing at fix {} ({} then {})",
                i + 1,
                pair[0].time,
                pair[1].time
            ));
        }
    }
    Ok(())
}

impl Track {
    /// Build a track from its fixes.
    ///
    /// Arguments
    /// -----------------
    /// * `idx` – Index of the track inside its run.
    /// * `fixes` – Fixes in chronological order.
    ///
    /// Return
    /// ----------
    /// * The track, or [`PolarLowsError::InvalidParameter`] if `fixes` is empty or the
    ///   timestamps are not strictly increasing.
    pub fn new(idx: TrackIdx, fixes: impl Into<Fixes>) -> Result<Self, PolarLowsError> {
        let fixes = fixes.into();
        check_fixes(&fixes).map_err(|e| PolarLowsError::InvalidParameter(format!("track {idx}: {e}")))?;
        Ok(Track {
            idx,
            fixes,
            categories: Categories::new(),
        })
    }

    #[inline]
    pub fn idx(&self) -> TrackIdx {
        self.idx
    }

    pub(crate) fn set_idx(&mut self, idx: TrackIdx) {
        self.idx = idx;
    }

    #[inline]
    pub fn fixes(&self) -> &[Fix] {
        &self.fixes
    }

    /// Number of fixes (`shape[0]`).
    #[inline]
    pub fn len(&self) -> usize {
        self.fixes.len()
    }

    /// Always `false`: a track holds at least one fix.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fixes.is_empty()
    }

    #[inline]
    pub fn first(&self) -> &Fix {
        &self.fixes[0]
    }

    #[inline]
    pub fn last(&self) -> &Fix {
        &self.fixes[self.fixes.len() - 1]
    }

    pub fn lifetime_h(&self) -> Hours {
        hours_between(&self.first().time, &self.last().time)
    }

    pub fn gen_lys_dist_km(&self) -> Kilometer {
        let (g, l) = (self.first(), self.last());
        great_circle_km(g.lon, g.lat, l.lon, l.lat)
    }

    /// Fraction of fixes whose vortex type is non-zero.
    pub fn nonzero_vortex_fraction(&self) -> f64 {
        let n_nonzero = self.fixes.iter().filter(|f| f.vortex_type != 0).count();
        n_nonzero as f64 / self.len() as f64
    }

    /// Fraction of fixes lying inside `bbox` (edges included).
    pub fn bbox_coverage(&self, bbox: &BoundingBox) -> f64 {
        let inside = self
            .fixes
            .iter()
            .filter(|f| bbox.contains(f.lon, f.lat))
            .count();
        inside as f64 / self.len() as f64
    }

    /// `true` if at least a fraction `thresh` of the fixes lies inside `bbox`.
    pub fn within_rectangle(&self, bbox: &BoundingBox, thresh: f64) -> bool {
        self.bbox_coverage(bbox) >= thresh
    }

    /// Instantaneous propagation speed at each fix, in km per time step.
    ///
    /// Interior fixes use the centred estimate `d(i-1, i+1) / 2`; the first and last fixes use
    /// the one-sided distance to their neighbour. A single-fix track has speed `0`.
    pub fn speeds_km_per_step(&self) -> Vec<f64> {
        let n = self.len();
        if n < 2 {
            return vec![0.0; n];
        }
        let dist = |a: &Fix, b: &Fix| great_circle_km(a.lon, a.lat, b.lon, b.lat);
        (0..n)
            .map(|i| match i {
                0 => dist(&self.fixes[0], &self.fixes[1]),
                i if i == n - 1 => dist(&self.fixes[n - 2], &self.fixes[n - 1]),
                i => dist(&self.fixes[i - 1], &self.fixes[i + 1]) / 2.0,
            })
            .collect()
    }

    #[inline]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn has_category(&self, label: &str) -> bool {
        self.categories.iter().any(|c| c == label)
    }

    /// Attach a label (no-op if already present).
    pub fn add_category(&mut self, label: &str) {
        if !self.has_category(label) {
            self.categories.push(label.to_string());
        }
    }

    pub fn clear_categories(&mut self) {
        self.categories.clear();
    }

    /// `true` if every fix satisfies `start <= time < end_exclusive`.
    pub(crate) fn within_minutes(&self, start: i64, end_exclusive: i64) -> bool {
        unix_minutes(&self.first().time) >= start && unix_minutes(&self.last().time) < end_exclusive
    }
}

impl AsRef<Track> for Track {
    fn as_ref(&self) -> &Track {
        self
    }
}

#[cfg(test)]
pub(crate) mod track_test {
    use super::*;
    use crate::time::compact_date_to_epoch;
    use approx::assert_relative_eq;

    /// Hourly track starting at 2010-01-01 00:00 through the given positions.
    pub(crate) fn hourly_track(idx: TrackIdx, positions: &[(f64, f64)], vortex: &[i32]) -> Track {
        let t0 = compact_date_to_epoch("201001010000").unwrap();
        let fixes: Fixes = positions
            .iter()
            .zip(vortex)
            .enumerate()
            .map(|(i, (&(lon, lat), &v))| {
                Fix::new(t0 + hifitime::Duration::from_hours(i as f64), lon, lat, v)
            })
            .collect();
        Track::new(idx, fixes).unwrap()
    }

    #[test]
    fn test_derived_attributes() {
        let mut pos = vec![(10.0, 70.0)];
        pos.extend(std::iter::repeat((10.0, 75.0)).take(6));
        let track = hourly_track(3, &pos, &[0; 7]);

        assert_eq!(track.idx(), 3);
        assert_eq!(track.len(), 7);
        assert_eq!(track.lifetime_h(), 6.0);
        assert_relative_eq!(track.gen_lys_dist_km(), 555.9746, epsilon = 1e-3);
        assert_eq!(track.nonzero_vortex_fraction(), 0.0);
    }

    #[test]
    fn test_invalid_tracks_are_rejected() {
        assert!(Track::new(0, Fixes::new()).is_err());

        let t0 = compact_date_to_epoch("201001010000").unwrap();
        let fixes: Fixes = vec![Fix::new(t0, 0.0, 70.0, 0), Fix::new(t0, 1.0, 70.0, 0)].into();
        assert!(Track::new(0, fixes).is_err());
    }

    #[test]
    fn test_speeds_one_sided_at_endpoints() {
        let track = hourly_track(0, &[(0.0, 70.0), (0.0, 71.0), (0.0, 73.0)], &[0, 0, 0]);
        let speeds = track.speeds_km_per_step();
        let one_deg = great_circle_km(0.0, 70.0, 0.0, 71.0);
        assert_relative_eq!(speeds[0], one_deg, epsilon = 1e-9);
        assert_relative_eq!(speeds[1], 1.5 * one_deg, epsilon = 1e-6);
        assert_relative_eq!(speeds[2], 2.0 * one_deg, epsilon = 1e-6);

        let single = hourly_track(1, &[(0.0, 70.0)], &[0]);
        assert_eq!(single.speeds_km_per_step(), vec![0.0]);
    }

    #[test]
    fn test_bbox_coverage_inclusive() {
        let track = hourly_track(0, &[(0.0, 70.0), (10.0, 80.0), (30.0, 80.0), (31.0, 80.0)], &[0; 4]);
        let bbox = BoundingBox::new(0.0, 30.0, 70.0, 80.0).unwrap();
        assert_eq!(track.bbox_coverage(&bbox), 0.75);
        assert!(track.within_rectangle(&bbox, 0.5));
        assert!(!track.within_rectangle(&bbox, 0.8));
    }

    #[test]
    fn test_categories_are_idempotent() {
        let mut track = hourly_track(0, &[(0.0, 70.0)], &[0]);
        track.add_category("pmc");
        track.add_category("pmc");
        assert_eq!(track.categories(), &["pmc".to_string()]);
        assert!(track.has_category("pmc"));
        track.clear_categories();
        assert!(!track.has_category("pmc"));
    }
}
