//! # Observational polar-low catalogues
//!
//! Reference tracks used as ground truth by the matcher.
//!
//! ## Overview
//! -----------------
//! * [`ObsTrack`] – A catalogue track: its catalogue id `N` and the [`Track`] of its fixes.
//! * [`stars_reader`] – STARS catalogue, North and South hemispheres, ids made globally unique.
//! * [`accacia_reader`] – ACCACIA catalogue (tab-delimited).
//! * [`prepare_tracks`] – Keep the observations long enough and (optionally) inside a
//!   bounding box.
//!
//! ## Error Handling
//! -----------------
//! A malformed row aborts the whole load with a
//! [`PolarLowsError::CatalogueParseError`] carrying the file, the line number and a
//! [`ParseCatalogueError`]: the reference set must be complete.
use camino::Utf8Path;
use hifitime::Epoch;
use itertools::Itertools;
use thiserror::Error;
use tracing::debug;

use crate::{
    constants::{Degree, Fixes, ObsId},
    geodesy::BoundingBox,
    polarlows_errors::PolarLowsError,
    time::unix_seconds,
    tracks::{filter::TrackFilter, Fix, Track},
};

pub mod accacia_reader;
pub mod stars_reader;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseCatalogueError {
    #[error("Expected {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },
    #[error("Invalid track id: {0}")]
    InvalidId(String),
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),
    #[error("Invalid number: {0}")]
    InvalidNumber(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid track: {0}")]
    InvalidTrack(String),
}

/// One parsed catalogue row, with its 1-based line number in the source file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CatalogueRow {
    pub line: usize,
    pub n: ObsId,
    pub time: Epoch,
    pub lon: Degree,
    pub lat: Degree,
}

/// An observed polar low.
#[derive(Debug, Clone, PartialEq)]
pub struct ObsTrack {
    n: ObsId,
    track: Track,
}

impl ObsTrack {
    pub fn new(n: ObsId, track: Track) -> Self {
        ObsTrack { n, track }
    }

    /// Catalogue id (`N` column).
    #[inline]
    pub fn n(&self) -> ObsId {
        self.n
    }

    #[inline]
    pub fn track(&self) -> &Track {
        &self.track
    }
}

impl AsRef<Track> for ObsTrack {
    fn as_ref(&self) -> &Track {
        &self.track
    }
}

/// Group rows by track id into [`ObsTrack`]s, sorted by id.
///
/// Rows of a group are ordered by time. Two rows of the same track at the same time are a
/// [`ParseCatalogueError::InvalidTrack`] reported at the line of the first row of the group.
pub(crate) fn group_rows(
    path: &Utf8Path,
    mut rows: Vec<CatalogueRow>,
) -> Result<Vec<ObsTrack>, PolarLowsError> {
    rows.sort_by_key(|r| (r.n, unix_seconds(&r.time)));

    let mut tracks = Vec::new();
    for (n, group) in &rows.iter().chunk_by(|r| r.n) {
        let group: Vec<&CatalogueRow> = group.collect();
        let Some(first_line) = group.iter().map(|r| r.line).min() else {
            continue;
        };
        let fixes: Fixes = group
            .iter()
            .map(|r| Fix::new(r.time, r.lon, r.lat, 0))
            .collect();
        let track = Track::new(n, fixes).map_err(|e| PolarLowsError::CatalogueParseError {
            path: path.to_owned(),
            line: first_line,
            source: ParseCatalogueError::InvalidTrack(e.to_string()),
        })?;
        tracks.push(ObsTrack::new(n, track));
    }

    debug!(%path, n_rows = rows.len(), n_tracks = tracks.len(), "catalogue grouped");
    Ok(tracks)
}

/// Keep the observations with `lifetime_h ≥ 6` and, if `bbox` is given, with at least half of
/// their fixes inside it. Order-preserving.
pub fn prepare_tracks(obs: Vec<ObsTrack>, bbox: Option<&BoundingBox>) -> Vec<ObsTrack> {
    let filter = TrackFilter {
        bbox: bbox.copied(),
        ..TrackFilter::default()
    };
    filter.filter(obs)
}

/// Parse a catalogue coordinate column.
pub(crate) fn parse_coordinate(field: &str) -> Result<Degree, ParseCatalogueError> {
    field
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseCatalogueError::InvalidCoordinate(field.to_string()))
}

/// Parse a catalogue track id column (an integer, possibly written as `12.0`).
pub(crate) fn parse_id(field: &str) -> Result<ObsId, ParseCatalogueError> {
    let invalid = || ParseCatalogueError::InvalidId(field.to_string());
    if let Ok(n) = field.parse::<ObsId>() {
        return Ok(n);
    }
    let v = field.parse::<f64>().map_err(|_| invalid())?;
    if v.fract() == 0.0 && v >= 0.0 && v <= ObsId::MAX as f64 {
        Ok(v as ObsId)
    } else {
        Err(invalid())
    }
}
