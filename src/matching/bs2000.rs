//! Blender & Schubert (2000) normalised track separation.
//!
//! For the common timestamps `t` of a reference and a candidate track:
//!
//! ```text
//! D = mean_t d(t) / (mean_t (s_r(t) + s_c(t)) / 2)
//! ```
//!
//! where `d(t)` is the great-circle separation and `s_r`, `s_c` the propagation speeds of
//! the two tracks (km per step, centred differences, one-sided at the track ends, see
//! [`Track::speeds_km_per_step`]). At least two common timestamps are required.
//!
//! Two stationary tracks give a zero denominator: `D = 0` if they coincide, `+∞` otherwise.
use crate::tracks::Track;

use super::simple::mean_separation_km;

/// Minimum number of common timestamps for a bs2000 score.
pub const MIN_COMMON_STEPS: usize = 2;

/// Normalised separation `D`, `None` with fewer than [`MIN_COMMON_STEPS`] common steps.
///
/// Arguments
/// -----------------
/// * `reference`, `ref_speeds` – Reference track and its per-fix speeds.
/// * `candidate`, `cand_speeds` – Candidate track and its per-fix speeds.
/// * `steps` – Common fix index pairs `(reference, candidate)`.
pub fn normalised_separation(
    reference: &Track,
    ref_speeds: &[f64],
    candidate: &Track,
    cand_speeds: &[f64],
    steps: &[(usize, usize)],
) -> Option<f64> {
    if steps.len() < MIN_COMMON_STEPS {
        return None;
    }
    let mean_dist = mean_separation_km(reference, candidate, steps)?;
    let mean_speed = steps
        .iter()
        .map(|&(i, j)| (ref_speeds[i] + cand_speeds[j]) / 2.0)
        .sum::<f64>()
        / steps.len() as f64;

    if mean_speed > 0.0 {
        Some(mean_dist / mean_speed)
    } else if mean_dist == 0.0 {
        Some(0.0)
    } else {
        Some(f64::INFINITY)
    }
}
