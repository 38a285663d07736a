//! # polarlows
//!
//! Categorise cyclone tracks computed on reanalyses (ERA5, ERA-Interim) as polar-low
//! candidates and match them to observed polar lows (STARS, ACCACIA).
//!
//! * [`tracks`] – Tracks, runs of tracks, raw tracker output and archives.
//! * [`land_mask`] – Land-sea masks and the land-proximity query.
//! * [`categorise`] – Predicates and the classifier.
//! * [`observations`] – Observational catalogues.
//! * [`matching`] – `simple` and `bs2000` track matching.
//! * [`pipeline`] – The categorise-and-save and match-to-observations flows.
pub mod categorise;
pub mod config;
pub mod constants;
pub mod geodesy;
pub mod land_mask;
pub mod matching;
pub mod observations;
pub mod pipeline;
pub mod polarlows_errors;
pub mod time;
pub mod tracks;

pub use polarlows_errors::PolarLowsError;
pub use tracks::{Fix, Track, TrackRun};
