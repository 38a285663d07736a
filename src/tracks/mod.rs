//! # Tracks: ingestion, storage, and filtering
//!
//! High-level facilities to **ingest**, **store**, and **subset** cyclone tracks produced by
//! the upstream tracking algorithm. The central types are [`Track`], a time-ordered sequence
//! of cyclone-centre [`Fix`]es, and [`TrackRun`], the collection of tracks of one
//! (dataset, tracker run, time window).
//!
//! Modules
//! -----------------
//! * [`track`](crate::tracks::track) – The [`Track`] type and its derived attributes
//!   (lifetime, genesis-to-lysis distance, propagation speeds, bounding-box coverage).
//! * [`track_run`](crate::tracks::track_run) – The [`TrackRun`] collection: concatenation,
//!   time slicing, subsets by classification label.
//! * [`vortrack_reader`](crate::tracks::vortrack_reader) – Reader of the raw tracker output
//!   (`vortrack*.txt` files, one track per file).
//! * [`filter`](crate::tracks::filter) – Lifetime and bounding-box filters.
//! * [`archive`](crate::tracks::archive) – The [`ArchiveStore`](crate::tracks::archive::ArchiveStore)
//!   plug-point and its Parquet implementation.
//!
//! Data Model
//! -----------------
//! * **Fix:** timestamp (UTC), longitude and latitude in **degrees**, integer vortex type
//!   and auxiliary scalar fields (vorticity, area, pressure, …) whose names are carried by
//!   the owning [`TrackRun`].
//! * **Track:** at least one fix, strictly increasing timestamps, a stable index inside its
//!   run, and zero or more classification labels.
//! * **TrackRun:** `Vec<Track>` plus the names of the auxiliary fields.
//!
//! Tracks are immutable once ingested; classification only attaches labels.
use hifitime::Epoch;
use smallvec::SmallVec;

use crate::constants::Degree;

pub mod archive;
pub mod filter;
pub mod track;
pub mod track_run;
pub mod vortrack_reader;

pub use track::Track;
pub use track_run::TrackRun;

/// A single cyclone-centre position.
///
/// Fields
/// -----------------
/// * `time` – Epoch of the fix (UTC).
/// * `lon`, `lat` – Position in degrees.
/// * `vortex_type` – Tracker vortex code (`0` or non-zero).
/// * `aux` – Auxiliary scalar fields, in the order of [`TrackRun::aux_names`].
#[derive(Debug, Clone, PartialEq)]
pub struct Fix {
    pub time: Epoch,
    pub lon: Degree,
    pub lat: Degree,
    pub vortex_type: i32,
    pub aux: SmallVec<[f64; 4]>,
}

impl Fix {
    /// A fix without auxiliary fields.
    pub fn new(time: Epoch, lon: Degree, lat: Degree, vortex_type: i32) -> Self {
        Fix {
            time,
            lon,
            lat,
            vortex_type,
            aux: SmallVec::new(),
        }
    }

    pub fn with_aux(mut self, aux: impl IntoIterator<Item = f64>) -> Self {
        self.aux = aux.into_iter().collect();
        self
    }
}
