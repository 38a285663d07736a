//! ACCACIA polar-low catalogue reader.
//!
//! A tab-delimited file without header, one fix per row: `N`, `time` (`YYYYMMDDHHMM`, UTC),
//! `lon`, `lat`.
use camino::Utf8Path;
use csv::{ReaderBuilder, StringRecord};
use tracing::info;

use crate::{polarlows_errors::PolarLowsError, time::compact_date_to_epoch};

use super::{group_rows, parse_coordinate, parse_id, CatalogueRow, ObsTrack, ParseCatalogueError};

const N_COLUMNS: usize = 4;

fn parse_record(line: usize, record: &StringRecord) -> Result<CatalogueRow, ParseCatalogueError> {
    if record.len() != N_COLUMNS {
        return Err(ParseCatalogueError::ColumnCount {
            expected: N_COLUMNS,
            found: record.len(),
        });
    }
    let field = |i: usize| record.get(i).unwrap_or_default().trim();

    Ok(CatalogueRow {
        line,
        n: parse_id(field(0))?,
        time: compact_date_to_epoch(field(1)).map_err(ParseCatalogueError::InvalidDate)?,
        lon: parse_coordinate(field(2))?,
        lat: parse_coordinate(field(3))?,
    })
}

/// Read the ACCACIA catalogue.
///
/// Return
/// ----------
/// * One [`ObsTrack`] per `N`, sorted by `N`, or the first I/O or parse error.
pub fn read_all(path: &Utf8Path) -> Result<Vec<ObsTrack>, PolarLowsError> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while reader.read_record(&mut record)? {
        let line = record.position().map_or(0, |p| p.line() as usize);
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        rows.push(
            parse_record(line, &record).map_err(|source| PolarLowsError::CatalogueParseError {
                path: path.to_owned(),
                line,
                source,
            })?,
        );
    }

    let tracks = group_rows(path, rows)?;
    info!(n_tracks = tracks.len(), %path, "ACCACIA catalogue loaded");
    Ok(tracks)
}
