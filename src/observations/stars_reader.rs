//! STARS polar-low catalogue reader.
//!
//! Each hemisphere file has five header lines followed by whitespace-separated rows:
//!
//! ```text
//! N  YYYY MM DD HH MM  lon  lat  f1  f2
//! ```
//!
//! Track ids of the South file are offset by the largest id of the North file so that the
//! ids of the concatenated catalogue are globally unique.
use camino::{Utf8Path, Utf8PathBuf};
use smallvec::SmallVec;
use tracing::info;

use crate::{polarlows_errors::PolarLowsError, time::split_date_to_epoch};

use super::{group_rows, parse_coordinate, parse_id, CatalogueRow, ObsTrack, ParseCatalogueError};

pub const STARS_NORTH_FILE: &str = "PolarLow_tracks_North_2002_2011";
pub const STARS_SOUTH_FILE: &str = "PolarLow_tracks_South_2002_2011";

const HEADER_LINES: usize = 5;
const N_COLUMNS: usize = 10;

/// Parse one data row (1-based `line` for error reporting).
fn parse_row(line: usize, text: &str) -> Result<CatalogueRow, ParseCatalogueError> {
    let fields: SmallVec<[&str; N_COLUMNS]> = text.split_whitespace().collect();
    if fields.len() != N_COLUMNS {
        return Err(ParseCatalogueError::ColumnCount {
            expected: N_COLUMNS,
            found: fields.len(),
        });
    }

    let time = split_date_to_epoch(&fields[1..6]).map_err(ParseCatalogueError::InvalidDate)?;
    // The two intensity columns are not kept; they only need to be numbers (NaN included).
    for field in &fields[8..] {
        field
            .parse::<f64>()
            .map_err(|_| ParseCatalogueError::InvalidNumber(field.to_string()))?;
    }

    Ok(CatalogueRow {
        line,
        n: parse_id(fields[0])?,
        time,
        lon: parse_coordinate(fields[6])?,
        lat: parse_coordinate(fields[7])?,
    })
}

/// Read the rows of one STARS hemisphere file.
pub(crate) fn read_rows(path: &Utf8Path) -> Result<Vec<CatalogueRow>, PolarLowsError> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .enumerate()
        .skip(HEADER_LINES)
        .filter(|(_, l)| !l.trim().is_empty())
        .map(|(i, l)| {
            parse_row(i + 1, l).map_err(|source| PolarLowsError::CatalogueParseError {
                path: path.to_owned(),
                line: i + 1,
                source,
            })
        })
        .collect()
}

/// Read a single STARS file into tracks, ids unchanged.
pub fn read_stars_file(path: &Utf8Path) -> Result<Vec<ObsTrack>, PolarLowsError> {
    group_rows(path, read_rows(path)?)
}

/// Read and concatenate the North and South STARS files of `starsdir`.
///
/// Return
/// ----------
/// * North tracks followed by South tracks, South ids offset by the largest North id.
pub fn read_all(starsdir: &Utf8Path) -> Result<Vec<ObsTrack>, PolarLowsError> {
    let north_path: Utf8PathBuf = starsdir.join(STARS_NORTH_FILE);
    let south_path: Utf8PathBuf = starsdir.join(STARS_SOUTH_FILE);
    read_hemispheres(&north_path, &south_path)
}

pub(crate) fn read_hemispheres(
    north_path: &Utf8Path,
    south_path: &Utf8Path,
) -> Result<Vec<ObsTrack>, PolarLowsError> {
    let north = read_rows(north_path)?;
    let mut south = read_rows(south_path)?;

    let offset = north.iter().map(|r| r.n).max().unwrap_or(0);
    for row in &mut south {
        row.n = row.n.checked_add(offset).ok_or_else(|| PolarLowsError::CatalogueParseError {
            path: south_path.to_owned(),
            line: row.line,
            source: ParseCatalogueError::InvalidId(row.n.to_string()),
        })?;
    }

    let mut tracks = group_rows(north_path, north)?;
    tracks.extend(group_rows(south_path, south)?);
    info!(
        n_tracks = tracks.len(),
        north = %north_path,
        south = %south_path,
        "STARS catalogue loaded"
    );
    Ok(tracks)
}
