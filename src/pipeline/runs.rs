//! Selection of the tracker runs to process.
//!
//! * [`parse_runs`] – `"a,b,c"` or `"a-b"` (inclusive) from the command line.
//! * [`run_grid`] – Runs listed in `runs_grid_tfreq_{dataset}.json`: one run per array
//!   element, ids counting from 100 in array order. Without the file, runs `0..nruns`.
use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, info};

use crate::{config::Dataset, constants::RUN_GRID_FIRST_ID, polarlows_errors::PolarLowsError};

/// Parse a list or range of run ids.
///
/// Return
/// ----------
/// * The run ids in the given order (`"3,1"` → `[3, 1]`, `"2-4"` → `[2, 3, 4]`), or
///   [`PolarLowsError::InvalidParameter`] for an empty, non-numeric or decreasing range.
pub fn parse_runs(runs: &str) -> Result<Vec<u32>, PolarLowsError> {
    let invalid = |why: &str| PolarLowsError::InvalidParameter(format!("invalid runs '{runs}': {why}"));
    let number = |s: &str| s.trim().parse::<u32>().map_err(|_| invalid("not a run number"));

    let trimmed = runs.trim();
    if trimmed.is_empty() {
        return Err(invalid("empty"));
    }

    if let Some((a, b)) = trimmed.split_once('-') {
        let (a, b) = (number(a)?, number(b)?);
        if a > b {
            return Err(invalid("decreasing range"));
        }
        return Ok((a..=b).collect());
    }

    trimmed.split(',').map(number).collect()
}

/// Path of the run-grid file of `dataset`.
pub fn run_grid_path(procdir: &Utf8Path, dataset: Dataset) -> Utf8PathBuf {
    procdir.join(format!("runs_grid_tfreq_{dataset}.json"))
}

/// Runs of `dataset` for the matching phase.
///
/// The grid file content is only used for its length: element `k` is run `100 + k`.
pub fn run_grid(procdir: &Utf8Path, dataset: Dataset, nruns: u32) -> Result<Vec<u32>, PolarLowsError> {
    let path = run_grid_path(procdir, dataset);
    if !path.is_file() {
        debug!(%path, nruns, "no run grid, using the default run range");
        return Ok((0..nruns).collect());
    }

    let content = std::fs::read_to_string(&path)?;
    let grid: Vec<serde_json::Value> = serde_json::from_str(&content)?;
    let n = u32::try_from(grid.len())
        .map_err(|_| PolarLowsError::InvalidParameter(format!("{path}: run grid too large")))?;
    info!(%path, n_runs = n, "run grid loaded");
    Ok((RUN_GRID_FIRST_ID..RUN_GRID_FIRST_ID + n).collect())
}
