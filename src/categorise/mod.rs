//! # Track categorisation
//!
//! Tag the tracks of a [`TrackRun`] with classification labels. A label is attached to a
//! track iff every predicate of its [`Condition`] holds.
//!
//! ## Overview
//! -----------------
//! * [`TrackPredicate`] – Capability trait, one `test(&Track) -> bool` method.
//! * [`LifetimeAtLeast`], [`VortexStats`], [`LandMaskProximity`] – The three predicates of the
//!   polar-low definition, configured by plain data.
//! * [`Condition`] – A label with its ordered predicates.
//! * [`classify`] – Apply an ordered list of conditions to a run, optionally with mutually
//!   exclusive labels (`strict`).
//! * [`polar_low_conditions`] – The default polar-low condition built from
//!   [`CategoriseParams`].
//!
//! ## Polar-low definition
//! -----------------
//! A track is a polar-low candidate iff
//! 1. `lifetime_h ≥ lifetime_h_min`,
//! 2. the fraction of fixes with `vortex_type ≠ 0` is `< max_nonzero_vortex_fraction` and
//!    `gen_lys_dist_km > min_gen_lys_dist_km`,
//! 3. for every fix, the land fraction of the mask within `rad_km` is `< lmask_thresh`.
//!
//! Predicates are evaluated in that order and short-circuit, so the mask search only runs on
//! tracks that passed the cheap tests.
//!
//! ## Determinism
//! -----------------
//! Classification is deterministic and idempotent: labels are only added, never duplicated.
use tracing::debug;

use crate::{
    constants::{Hours, Kilometer},
    land_mask::LandSeaMask,
    tracks::{Track, TrackRun},
};

pub mod params;

pub use params::{CategoriseParams, CategoriseParamsBuilder};

/// A boolean test on a track.
pub trait TrackPredicate {
    fn test(&self, track: &Track) -> bool;
}

/// `lifetime_h ≥ min_lifetime_h`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LifetimeAtLeast {
    pub min_lifetime_h: Hours,
}

impl TrackPredicate for LifetimeAtLeast {
    fn test(&self, track: &Track) -> bool {
        track.lifetime_h() >= self.min_lifetime_h
    }
}

/// Vortex character and displacement.
///
/// Passes iff the fraction of fixes with a non-zero vortex type is strictly below
/// `max_nonzero_fraction` and the genesis-to-lysis distance is strictly above
/// `min_gen_lys_dist_km`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VortexStats {
    pub max_nonzero_fraction: f64,
    pub min_gen_lys_dist_km: Kilometer,
}

impl TrackPredicate for VortexStats {
    fn test(&self, track: &Track) -> bool {
        track.nonzero_vortex_fraction() < self.max_nonzero_fraction
            && track.gen_lys_dist_km() > self.min_gen_lys_dist_km
    }
}

/// No fix too close to land.
///
/// Passes iff, for every fix, the fraction of land cells within `rad_km` is strictly below
/// `lmask_thresh`. Fixes far from the mask envelope see only sea.
#[derive(Debug, Clone, Copy)]
pub struct LandMaskProximity<'a> {
    pub mask: &'a LandSeaMask,
    pub rad_km: Kilometer,
    pub lmask_thresh: f64,
}

impl TrackPredicate for LandMaskProximity<'_> {
    fn test(&self, track: &Track) -> bool {
        track
            .fixes()
            .iter()
            .all(|f| self.mask.land_fraction(f.lon, f.lat, self.rad_km) < self.lmask_thresh)
    }
}

/// A classification label and the predicates a track must satisfy to receive it.
pub struct Condition<'a> {
    pub label: String,
    pub predicates: Vec<Box<dyn TrackPredicate + 'a>>,
}

impl<'a> Condition<'a> {
    pub fn new(label: impl Into<String>) -> Self {
        Condition {
            label: label.into(),
            predicates: Vec::new(),
        }
    }

    /// Append a predicate; predicates are evaluated in insertion order.
    pub fn with(mut self, predicate: impl TrackPredicate + 'a) -> Self {
        self.predicates.push(Box::new(predicate));
        self
    }

    /// `true` iff every predicate holds (an empty condition always holds).
    pub fn matches(&self, track: &Track) -> bool {
        self.predicates.iter().all(|p| p.test(track))
    }
}

impl std::fmt::Debug for Condition<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Condition")
            .field("label", &self.label)
            .field("n_predicates", &self.predicates.len())
            .finish()
    }
}

/// Tag the tracks of `run`.
///
/// Arguments
/// -----------------
/// * `run` – Tracks to classify, labels are added in place.
/// * `conditions` – Ordered `(label, predicates)` list.
/// * `strict` – When `true`, a track that received a label is not evaluated against the
///   following conditions (labels are mutually exclusive).
pub fn classify(run: &mut TrackRun, conditions: &[Condition<'_>], strict: bool) {
    for track in run.tracks_mut() {
        for condition in conditions {
            if condition.matches(track) {
                track.add_category(&condition.label);
                if strict {
                    break;
                }
            }
        }
    }

    for condition in conditions {
        debug!(
            label = %condition.label,
            n_tracks = run.size(Some(condition.label.as_str())),
            n_total = run.len(),
            "tracks categorised"
        );
    }
}

/// The polar-low condition: lifetime, vortex statistics, then land-mask proximity.
pub fn polar_low_conditions<'a>(
    mask: &'a LandSeaMask,
    params: &CategoriseParams,
    cat: &str,
) -> Vec<Condition<'a>> {
    vec![Condition::new(cat)
        .with(LifetimeAtLeast {
            min_lifetime_h: params.lifetime_h,
        })
        .with(VortexStats {
            max_nonzero_fraction: params.max_nonzero_vortex_fraction,
            min_gen_lys_dist_km: params.min_gen_lys_dist_km,
        })
        .with(LandMaskProximity {
            mask,
            rad_km: params.rad_km,
            lmask_thresh: params.lmask_thresh,
        })]
}
