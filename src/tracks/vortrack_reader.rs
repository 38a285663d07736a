//! # Raw tracker output reader
//!
//! Reads the `vortrack*.txt` files written by the upstream cyclone tracker for one
//! (dataset, run, winter) directory and turns them into a [`TrackRun`].
//!
//! ## File layout
//! -----------------
//! * one file per track, processed in file-name order; track indices are assigned
//!   `0, 1, …` in that order,
//! * the first line of a file is a header and is skipped, blank lines are ignored,
//! * every other line holds whitespace-separated values named by the `columns` list.
//!
//! Required columns are `lon`, `lat` (degrees), `time` (`YYYYMMDDHHMM`, UTC) and
//! `vortex_type` (integer, a float value such as `1.0` is accepted). Every other column is
//! read as an `f64` auxiliary field and keeps its position in `columns`.
//!
//! ## Error Handling
//! -----------------
//! * A missing directory surfaces as [`PolarLowsError::IoError`].
//! * A malformed line, or a line whose timestamp does not follow the previous one, is a
//!   [`PolarLowsError::TrackParseError`] carrying the file path and line number.
//! * A file without data lines is skipped with a `warn` event.
use camino::{Utf8Path, Utf8PathBuf};
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    constants::{Fixes, TrackIdx},
    polarlows_errors::PolarLowsError,
    time::{compact_date_to_epoch, unix_minutes},
};

use super::{Fix, Track, TrackRun};

const REQUIRED_COLUMNS: [&str; 4] = ["lon", "lat", "time", "vortex_type"];

/// Positions of the required and auxiliary columns inside a data line.
#[derive(Debug, Clone)]
pub(crate) struct ColumnLayout {
    lon: usize,
    lat: usize,
    time: usize,
    vortex_type: usize,
    aux: Vec<usize>,
    aux_names: Vec<String>,
    width: usize,
}

impl ColumnLayout {
    pub(crate) fn new(columns: &[String]) -> Result<Self, PolarLowsError> {
        let position = |name: &str| {
            columns.iter().position(|c| c == name).ok_or_else(|| {
                PolarLowsError::InvalidParameter(format!(
                    "column '{name}' is missing from the column layout {columns:?}"
                ))
            })
        };

        let (aux, aux_names): (Vec<usize>, Vec<String>) = columns
            .iter()
            .enumerate()
            .filter(|(_, c)| !REQUIRED_COLUMNS.contains(&c.as_str()))
            .map(|(i, c)| (i, c.clone()))
            .unzip();

        Ok(ColumnLayout {
            lon: position("lon")?,
            lat: position("lat")?,
            time: position("time")?,
            vortex_type: position("vortex_type")?,
            aux,
            aux_names,
            width: columns.len(),
        })
    }

    pub(crate) fn aux_names(&self) -> &[String] {
        &self.aux_names
    }

    /// Parse one data line into a [`Fix`].
    pub(crate) fn parse_line(&self, line: &str) -> Result<Fix, String> {
        let fields: SmallVec<[&str; 8]> = line.split_whitespace().collect();
        if fields.len() != self.width {
            return Err(format!(
                "expected {} columns, found {}",
                self.width,
                fields.len()
            ));
        }

        let float = |i: usize| {
            fields[i]
                .parse::<f64>()
                .map_err(|_| format!("invalid number '{}'", fields[i]))
        };

        let vortex = float(self.vortex_type)?;
        if vortex.fract() != 0.0 {
            return Err(format!("vortex_type must be an integer, got '{}'", fields[self.vortex_type]));
        }

        let fix = Fix::new(
            compact_date_to_epoch(fields[self.time])?,
            float(self.lon)?,
            float(self.lat)?,
            vortex as i32,
        )
        .with_aux(self.aux.iter().map(|&i| float(i)).collect::<Result<Vec<_>, _>>()?);
        Ok(fix)
    }
}

/// Read a single track file; `Ok(None)` when the file holds no data line.
fn read_vortrack_file(
    path: &Utf8Path,
    layout: &ColumnLayout,
    idx: TrackIdx,
) -> Result<Option<Track>, PolarLowsError> {
    let content = std::fs::read_to_string(path)?;
    let parse_error = |line: usize, reason: String| PolarLowsError::TrackParseError {
        path: path.to_owned(),
        line,
        reason,
    };

    let mut fixes = Fixes::new();
    for (lineno, line) in content.lines().enumerate().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let fix = layout.parse_line(line).map_err(|e| parse_error(lineno + 1, e))?;
        if let Some(prev) = fixes.last() {
            if unix_minutes(&fix.time) <= unix_minutes(&prev.time) {
                return Err(parse_error(
                    lineno + 1,
                    format!("timestamp {} does not follow {}", fix.time, prev.time),
                ));
            }
        }
        fixes.push(fix);
    }

    if fixes.is_empty() {
        return Ok(None);
    }
    Ok(Some(Track::new(idx, fixes)?))
}

/// List the `vortrack*.txt` files of a directory, sorted by name.
fn vortrack_files(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>, PolarLowsError> {
    let mut files = Vec::new();
    for entry in dir.read_dir_utf8()? {
        let entry = entry?;
        let name = entry.file_name();
        if name.starts_with("vortrack") && name.ends_with(".txt") && entry.file_type()?.is_file() {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

/// Load every track of a tracker-output directory.
///
/// Arguments
/// -----------------
/// * `dir` – Directory of `vortrack*.txt` files.
/// * `columns` – Column names, in file order.
///
/// Return
/// ----------
/// * The [`TrackRun`] (possibly empty), or the first I/O or parse error.
pub fn read_vortrack_dir(dir: &Utf8Path, columns: &[String]) -> Result<TrackRun, PolarLowsError> {
    let layout = ColumnLayout::new(columns)?;
    let files = vortrack_files(dir)?;

    let mut tracks = Vec::with_capacity(files.len());
    for path in &files {
        match read_vortrack_file(path, &layout, tracks.len() as TrackIdx)? {
            Some(track) => tracks.push(track),
            None => warn!(path = %path, "track file without data lines, skipped"),
        }
    }
    debug!(dir = %dir, n_files = files.len(), n_tracks = tracks.len(), "tracker output loaded");

    TrackRun::from_tracks(layout.aux_names().to_vec(), tracks)
}
