//! # Track matching
//!
//! Pair model tracks (candidates) with observed tracks (references).
//!
//! ## Overview
//! -----------------
//! * [`MatchConfig`] – The method and its tolerance: `simple` (mean separation, km) or
//!   `bs2000` (Blender & Schubert 2000 normalised separation, unitless).
//! * [`match_tracks`] – Score every (reference, candidate) pair on their common timestamps,
//!   keep the admissible ones, then resolve conflicts one-to-one by ascending score.
//! * [`simple`], [`bs2000`] – The two scores.
//!
//! ## Pairing rule
//! -----------------
//! Admissible pairs (score ≤ tolerance) are sorted by ascending score, then reference index,
//! then candidate position. A pair is kept iff neither its candidate nor its reference has
//! already been kept. Raising the tolerance only appends pairs with larger scores after the
//! previous ones, so a kept pair is still kept at any larger tolerance.
//!
//! Output is ordered by reference index, then candidate position.
//!
//! ## Units
//! -----------------
//! * Distances in **km** (haversine, R = 6371 km).
//! * Speeds in **km per time step** of the track.
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    constants::TrackIdx, polarlows_errors::PolarLowsError, time::unix_minutes, tracks::Track,
};

pub mod bs2000;
pub mod simple;

/// Method and tolerance of the matcher.
///
/// Serialised as `{"method": "bs2000", "beta": 25.0}` or
/// `{"method": "simple", "thresh_dist": 150.0}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum MatchConfig {
    Bs2000 { beta: f64 },
    Simple { thresh_dist: f64 },
}

impl MatchConfig {
    pub fn method(&self) -> &'static str {
        match self {
            MatchConfig::Bs2000 { .. } => "bs2000",
            MatchConfig::Simple { .. } => "simple",
        }
    }

    /// The tolerance, whatever the method.
    pub fn tolerance(&self) -> f64 {
        match *self {
            MatchConfig::Bs2000 { beta } => beta,
            MatchConfig::Simple { thresh_dist } => thresh_dist,
        }
    }

    fn tolerance_name(&self) -> &'static str {
        match self {
            MatchConfig::Bs2000 { .. } => "beta",
            MatchConfig::Simple { .. } => "thresh_dist",
        }
    }

    /// Check that the tolerance is finite and non-negative.
    pub fn validate(&self) -> Result<(), PolarLowsError> {
        let tol = self.tolerance();
        if !tol.is_finite() || tol < 0.0 {
            return Err(PolarLowsError::MatchConfigError(format!(
                "{} must be finite and non-negative, got {tol}",
                self.tolerance_name()
            )));
        }
        Ok(())
    }

    /// `key=value` segments joined by `_`, e.g. `method=bs2000_beta=25`.
    ///
    /// Numbers are rendered as integers when the conversion is lossless.
    pub fn label(&self) -> String {
        format!(
            "method={}_{}={}",
            self.method(),
            self.tolerance_name(),
            render_number(self.tolerance())
        )
    }
}

impl std::fmt::Display for MatchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

fn render_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// The default sweep: bs2000 with beta ∈ {25, 50, 75, 100}, simple with
/// thresh_dist ∈ {150, 200, 250, 300} km.
pub fn default_match_options() -> Vec<MatchConfig> {
    [25.0, 50.0, 75.0, 100.0]
        .into_iter()
        .map(|beta| MatchConfig::Bs2000 { beta })
        .chain(
            [150.0, 200.0, 250.0, 300.0]
                .into_iter()
                .map(|thresh_dist| MatchConfig::Simple { thresh_dist }),
        )
        .collect()
}

/// A matched (candidate, reference) pair.
///
/// * `candidate` – [`Track::idx`] of the candidate.
/// * `reference` – Position of the reference in the slice given to [`match_tracks`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MatchPair {
    pub candidate: TrackIdx,
    pub reference: usize,
}

/// Index pairs `(i, j)` of the fixes of `a` and `b` that share the same timestamp (to the
/// minute), in chronological order.
pub(crate) fn common_steps(a: &Track, b: &Track) -> Vec<(usize, usize)> {
    let (fa, fb) = (a.fixes(), b.fixes());
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < fa.len() && j < fb.len() {
        let (ta, tb) = (unix_minutes(&fa[i].time), unix_minutes(&fb[j].time));
        match ta.cmp(&tb) {
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
            std::cmp::Ordering::Equal => {
                out.push((i, j));
                i += 1;
                j += 1;
            }
        }
    }
    out
}

/// Score of one (reference, candidate) pair, `None` when the pair cannot match.
enum Scorer {
    Simple,
    Bs2000 {
        ref_speeds: Vec<Vec<f64>>,
        cand_speeds: Vec<Vec<f64>>,
    },
}

impl Scorer {
    fn score(&self, r: usize, reference: &Track, c: usize, candidate: &Track) -> Option<f64> {
        let steps = common_steps(reference, candidate);
        match self {
            Scorer::Simple => simple::mean_separation_km(reference, candidate, &steps),
            Scorer::Bs2000 {
                ref_speeds,
                cand_speeds,
            } => bs2000::normalised_separation(
                reference,
                &ref_speeds[r],
                candidate,
                &cand_speeds[c],
                &steps,
            ),
        }
    }
}

/// Pair candidates with references.
///
/// Arguments
/// -----------------
/// * `candidates` – Model tracks (may be empty).
/// * `references` – Observed tracks, must not be empty.
/// * `config` – Method and tolerance.
///
/// Return
/// ----------
/// * One-to-one [`MatchPair`]s ordered by reference index then candidate position, or
///   [`PolarLowsError::MatchConfigError`] when `references` is empty or the tolerance is
///   invalid. Preconditions are checked before any scoring.
///
/// See also
/// ------------
/// * [`simple::mean_separation_km`] – Score of the `simple` method.
/// * [`bs2000::normalised_separation`] – Score of the `bs2000` method.
pub fn match_tracks<C: AsRef<Track>, R: AsRef<Track>>(
    candidates: &[C],
    references: &[R],
    config: &MatchConfig,
) -> Result<Vec<MatchPair>, PolarLowsError> {
    config.validate()?;
    if references.is_empty() {
        return Err(PolarLowsError::MatchConfigError(
            "the list of reference tracks is empty".into(),
        ));
    }
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let scorer = match config {
        MatchConfig::Simple { .. } => Scorer::Simple,
        MatchConfig::Bs2000 { .. } => Scorer::Bs2000 {
            ref_speeds: references
                .iter()
                .map(|r| r.as_ref().speeds_km_per_step())
                .collect(),
            cand_speeds: candidates
                .iter()
                .map(|c| c.as_ref().speeds_km_per_step())
                .collect(),
        },
    };
    let tolerance = config.tolerance();

    let mut admissible: Vec<(OrderedFloat<f64>, usize, usize)> = Vec::new();
    for (r, reference) in references.iter().enumerate() {
        for (c, candidate) in candidates.iter().enumerate() {
            if let Some(score) = scorer.score(r, reference.as_ref(), c, candidate.as_ref()) {
                if score <= tolerance {
                    admissible.push((OrderedFloat(score), r, c));
                }
            }
        }
    }
    admissible.sort_unstable();

    let mut ref_used = vec![false; references.len()];
    let mut cand_used = vec![false; candidates.len()];
    let mut kept: Vec<(usize, usize)> = Vec::new();
    for (_, r, c) in admissible {
        if !ref_used[r] && !cand_used[c] {
            ref_used[r] = true;
            cand_used[c] = true;
            kept.push((r, c));
        }
    }
    kept.sort_unstable();

    debug!(
        config = %config,
        n_candidates = candidates.len(),
        n_references = references.len(),
        n_pairs = kept.len(),
        "tracks matched"
    );

    Ok(kept
        .into_iter()
        .map(|(r, c)| MatchPair {
            candidate: candidates[c].as_ref().idx(),
            reference: r,
        })
        .collect())
}

#[cfg(test)]
pub(crate) mod matching_test {
    use super::*;
    use crate::{
        constants::{Fixes, EARTH_RADIUS_KM},
        time::compact_date_to_epoch,
        tracks::Fix,
    };

    /// Degrees of latitude spanning `km` on the sphere.
    pub(crate) fn lat_deg(km: f64) -> f64 {
        (km / EARTH_RADIUS_KM).to_degrees()
    }

    /// Hourly track starting `start_h` hours after 2010-01-01 00:00.
    pub(crate) fn track_at(idx: TrackIdx, start_h: usize, positions: &[(f64, f64)]) -> Track {
        let t0 = compact_date_to_epoch("201001010000").unwrap();
        let fixes: Fixes = positions
            .iter()
            .enumerate()
            .map(|(i, &(lon, lat))| {
                Fix::new(
                    t0 + hifitime::Duration::from_hours((start_h + i) as f64),
                    lon,
                    lat,
                    0,
                )
            })
            .collect();
        Track::new(idx, fixes).unwrap()
    }

    #[test]
    fn test_labels_and_json() {
        let opts = default_match_options();
        assert_eq!(opts.len(), 8);
        assert_eq!(opts[0].label(), "method=bs2000_beta=25");
        assert_eq!(opts[4].label(), "method=simple_thresh_dist=150");
        assert_eq!(
            MatchConfig::Simple { thresh_dist: 150.5 }.label(),
            "method=simple_thresh_dist=150.5"
        );

        let cfg: MatchConfig = serde_json::from_str(r#"{"method": "bs2000", "beta": 25.0}"#).unwrap();
        assert_eq!(cfg, MatchConfig::Bs2000 { beta: 25.0 });
        assert!(serde_json::from_str::<MatchConfig>(r#"{"method": "nearest", "beta": 1.0}"#).is_err());
    }

    #[test]
    fn test_preconditions() {
        let refs = vec![track_at(0, 0, &[(0.0, 70.0)])];
        let none: Vec<Track> = vec![];

        let err = match_tracks(&refs, &none, &MatchConfig::Simple { thresh_dist: 100.0 });
        assert!(matches!(err, Err(PolarLowsError::MatchConfigError(_))));

        let err = match_tracks(&refs, &refs, &MatchConfig::Bs2000 { beta: -1.0 });
        assert!(matches!(err, Err(PolarLowsError::MatchConfigError(_))));

        let pairs = match_tracks(&none, &refs, &MatchConfig::Simple { thresh_dist: 100.0 });
        assert_eq!(pairs, Ok(vec![]));
    }

    #[test]
    fn test_common_steps() {
        let a = track_at(0, 0, &[(0.0, 70.0); 5]);
        let b = track_at(1, 3, &[(0.0, 70.0); 5]);
        assert_eq!(common_steps(&a, &b), vec![(3, 0), (4, 1)]);
        let c = track_at(2, 10, &[(0.0, 70.0); 2]);
        assert!(common_steps(&a, &c).is_empty());
    }

    #[test]
    fn test_simple_threshold() {
        // Five common hours, candidate 120 km north of the reference.
        let reference = track_at(0, 0, &[(0.0, 70.0); 5]);
        let candidate = track_at(7, 0, &[(0.0, 70.0 + lat_deg(120.0)); 5]);
        let refs = [&reference];
        let cands = [&candidate];

        let pairs = match_tracks(&cands, &refs, &MatchConfig::Simple { thresh_dist: 150.0 }).unwrap();
        assert_eq!(
            pairs,
            vec![MatchPair {
                candidate: 7,
                reference: 0
            }]
        );
        let pairs = match_tracks(&cands, &refs, &MatchConfig::Simple { thresh_dist: 100.0 }).unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_bs2000_prefers_smaller_separation() {
        // Reference moving north at 100 km/h; both candidates move with it.
        let step = lat_deg(100.0);
        let path = |offset_km: f64| -> Vec<(f64, f64)> {
            (0..5)
                .map(|k| (0.0, 70.0 + k as f64 * step + lat_deg(offset_km)))
                .collect()
        };
        let reference = track_at(0, 0, &path(0.0));
        // D = offset / 100 km: 0.5 and 0.3.
        let far = track_at(1, 0, &path(50.0));
        let near = track_at(2, 0, &path(30.0));

        let pairs = match_tracks(&[&far, &near], &[&reference], &MatchConfig::Bs2000 { beta: 1.0 })
            .unwrap();
        assert_eq!(
            pairs,
            vec![MatchPair {
                candidate: 2,
                reference: 0
            }]
        );
    }

    #[test]
    fn test_output_order_and_one_to_one() {
        let r0 = track_at(0, 0, &[(0.0, 70.0); 4]);
        let r1 = track_at(1, 0, &[(20.0, 70.0); 4]);
        let c_a = track_at(10, 0, &[(20.0, 70.2); 4]);
        let c_b = track_at(11, 0, &[(0.0, 70.2); 4]);
        let c_c = track_at(12, 0, &[(0.0, 70.5); 4]);

        let pairs = match_tracks(
            &[&c_a, &c_b, &c_c],
            &[&r0, &r1],
            &MatchConfig::Simple { thresh_dist: 100.0 },
        )
        .unwrap();
        assert_eq!(
            pairs,
            vec![
                MatchPair {
                    candidate: 11,
                    reference: 0
                },
                MatchPair {
                    candidate: 10,
                    reference: 1
                },
            ]
        );
    }
}
