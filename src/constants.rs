//! # Constants and type definitions for polarlows
//!
//! This module centralizes the **physical constants**, **default thresholds**, and **common type
//! definitions** used throughout the `polarlows` library.
//!
//! ## Overview
//!
//! - Spherical-earth constants used by the great-circle distance
//! - Default thresholds of the polar-low categorisation
//! - Core type aliases used across the crate
//! - Container types for storing fixes and tracks
//!
//! These definitions are used by all main modules, including the classifier, the matcher,
//! the observation readers and the pipeline driver.

use ahash::RandomState;
use smallvec::SmallVec;
use std::collections::HashMap;

use crate::tracks::Fix;

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Mean Earth radius in kilometers (spherical earth)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Number of seconds in one hour
pub const SECONDS_PER_HOUR: f64 = 3_600.0;

/// Numerical epsilon used for floating-point comparisons
pub const EPS: f64 = 1e-9;

// -------------------------------------------------------------------------------------------------
// Categorisation defaults
// -------------------------------------------------------------------------------------------------

/// Default categorisation label for candidate polar lows
pub const DEFAULT_CAT: &str = "pmc";

/// Minimum track lifetime (hours)
pub const DEFAULT_MIN_LIFETIME_H: f64 = 6.0;

/// Search radius around each fix for the land-sea mask test (km)
pub const DEFAULT_LSM_RADIUS_KM: f64 = 70.0;

/// A fix is "too close to land" when the land fraction reaches this value
pub const DEFAULT_LMASK_THRESH: f64 = 0.5;

/// Upper bound (exclusive) on the fraction of fixes with a non-zero vortex type
pub const DEFAULT_MAX_NONZERO_VORTEX_FRACTION: f64 = 0.2;

/// Lower bound (exclusive) on the genesis-to-lysis distance (km)
pub const DEFAULT_MIN_GEN_LYS_DIST_KM: f64 = 300.0;

/// Default fraction of fixes that must lie in a bounding box
pub const DEFAULT_BBOX_COVERAGE: f64 = 0.5;

/// First run id of a run-grid file
pub const RUN_GRID_FIRST_ID: u32 = 100;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Duration in hours
pub type Hours = f64;

/// Identifier of a track inside a [`TrackRun`](crate::tracks::TrackRun)
pub type TrackIdx = u32;

/// Identifier of an observational track (`N` column of the catalogues)
pub type ObsId = u32;

/// Hash map with the crate-wide fast hasher
pub type FastHashMap<K, V> = HashMap<K, V, RandomState>;

/// A small, inline-optimized container for the fixes of a single track.
pub type Fixes = SmallVec<[Fix; 16]>;

/// Classification labels attached to a track (rarely more than one).
pub type Categories = SmallVec<[String; 2]>;
