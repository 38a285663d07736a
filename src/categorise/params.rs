//! Thresholds of the polar-low categorisation and their validating builder.
use std::cmp::Ordering::{Equal, Greater, Less};

use serde::{Deserialize, Serialize};

use crate::{
    constants::{
        Hours, Kilometer, DEFAULT_LMASK_THRESH, DEFAULT_LSM_RADIUS_KM,
        DEFAULT_MAX_NONZERO_VORTEX_FRACTION, DEFAULT_MIN_GEN_LYS_DIST_KM, DEFAULT_MIN_LIFETIME_H,
    },
    polarlows_errors::PolarLowsError,
};

/// Thresholds of the composite polar-low predicate.
///
/// Fields
/// -----------------
/// * `lifetime_h` – Minimum lifetime, inclusive (default 6 h).
/// * `rad_km` – Radius of the land-sea mask neighbourhood around each fix (default 70 km).
/// * `lmask_thresh` – A fix is too close to land when its land fraction reaches this value
///   (default 0.5).
/// * `max_nonzero_vortex_fraction` – Exclusive upper bound on the fraction of fixes with a
///   non-zero vortex type (default 0.2).
/// * `min_gen_lys_dist_km` – Exclusive lower bound on the genesis-to-lysis distance
///   (default 300 km).
///
/// See also
/// ------------
/// * [`CategoriseParamsBuilder::build`] – Validation rules.
/// * [`polar_low_conditions`](crate::categorise::polar_low_conditions) – Turns the thresholds
///   into predicates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoriseParams {
    pub lifetime_h: Hours,
    pub rad_km: Kilometer,
    pub lmask_thresh: f64,
    pub max_nonzero_vortex_fraction: f64,
    pub min_gen_lys_dist_km: Kilometer,
}

impl Default for CategoriseParams {
    fn default() -> Self {
        CategoriseParams {
            lifetime_h: DEFAULT_MIN_LIFETIME_H,
            rad_km: DEFAULT_LSM_RADIUS_KM,
            lmask_thresh: DEFAULT_LMASK_THRESH,
            max_nonzero_vortex_fraction: DEFAULT_MAX_NONZERO_VORTEX_FRACTION,
            min_gen_lys_dist_km: DEFAULT_MIN_GEN_LYS_DIST_KM,
        }
    }
}

impl CategoriseParams {
    pub fn builder() -> CategoriseParamsBuilder {
        CategoriseParamsBuilder::new()
    }

    /// Run the builder checks on an already assembled value (e.g. one read from JSON).
    pub fn validate(self) -> Result<Self, PolarLowsError> {
        CategoriseParamsBuilder { params: self }.build()
    }
}

#[derive(Debug, Clone)]
pub struct CategoriseParamsBuilder {
    params: CategoriseParams,
}

impl Default for CategoriseParamsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoriseParamsBuilder {
    /// Create a new builder initialized with default values.
    pub fn new() -> Self {
        Self {
            params: CategoriseParams::default(),
        }
    }

    pub fn lifetime_h(mut self, v: Hours) -> Self {
        self.params.lifetime_h = v;
        self
    }
    pub fn rad_km(mut self, v: Kilometer) -> Self {
        self.params.rad_km = v;
        self
    }
    pub fn lmask_thresh(mut self, v: f64) -> Self {
        self.params.lmask_thresh = v;
        self
    }
    pub fn max_nonzero_vortex_fraction(mut self, v: f64) -> Self {
        self.params.max_nonzero_vortex_fraction = v;
        self
    }
    pub fn min_gen_lys_dist_km(mut self, v: Kilometer) -> Self {
        self.params.min_gen_lys_dist_km = v;
        self
    }

    /// Return true iff x > 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn gt0(x: f64) -> bool {
        x.partial_cmp(&0.0) == Some(Greater)
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Return true iff a <= b and comparable (i.e., not NaN).
    #[inline]
    fn le(a: f64, b: f64) -> bool {
        matches!(a.partial_cmp(&b), Some(Less) | Some(Equal))
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `lifetime_h ≥ 0`, `min_gen_lys_dist_km ≥ 0`,
    /// * `rad_km > 0`,
    /// * `0 < lmask_thresh ≤ 1`,
    /// * `0 ≤ max_nonzero_vortex_fraction ≤ 1`.
    ///
    /// NaN fails every rule.
    ///
    /// Return
    /// ----------
    /// * The validated parameters, or [`PolarLowsError::InvalidParameter`].
    pub fn build(self) -> Result<CategoriseParams, PolarLowsError> {
        let p = &self.params;

        if !Self::ge0(p.lifetime_h) {
            return Err(PolarLowsError::InvalidParameter(
                "lifetime_h must be non-negative".into(),
            ));
        }
        if !Self::ge0(p.min_gen_lys_dist_km) {
            return Err(PolarLowsError::InvalidParameter(
                "min_gen_lys_dist_km must be non-negative".into(),
            ));
        }
        if !Self::gt0(p.rad_km) {
            return Err(PolarLowsError::InvalidParameter(
                "rad_km must be strictly positive".into(),
            ));
        }
        if !(Self::gt0(p.lmask_thresh) && Self::le(p.lmask_thresh, 1.0)) {
            return Err(PolarLowsError::InvalidParameter(
                "lmask_thresh must be in (0, 1]".into(),
            ));
        }
        if !(Self::ge0(p.max_nonzero_vortex_fraction)
            && Self::le(p.max_nonzero_vortex_fraction, 1.0))
        {
            return Err(PolarLowsError::InvalidParameter(
                "max_nonzero_vortex_fraction must be in [0, 1]".into(),
            ));
        }

        Ok(self.params)
    }
}
