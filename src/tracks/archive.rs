//! # Archive store for categorised track runs
//!
//! The classifier and the matcher only rely on the **round-trip property** of the archive:
//! `from_archive(to_archive(run)) == run` (fixes, auxiliary fields, labels and track
//! indices). The [`ArchiveStore`] trait is the plug-point; [`ParquetArchive`] is the default
//! implementation.
//!
//! ## Parquet layout
//! -----------------
//! One row per fix, tracks stored contiguously in run order:
//!
//! | column        | type    | content                                   |
//! |---------------|---------|-------------------------------------------|
//! | `track_idx`   | UInt32  | [`Track::idx`]                            |
//! | `time`        | Int64   | Unix seconds (UTC)                        |
//! | `lon`, `lat`  | Float64 | degrees                                   |
//! | `vortex_type` | Int32   | tracker vortex code                       |
//! | `categories`  | Utf8    | comma-joined labels of the owning track   |
//! | *aux…*        | Float64 | one column per auxiliary field, in order  |
//!
//! ## Error Handling
//! -----------------
//! Every failure (I/O, Parquet/Arrow decoding, schema mismatch) is reported as
//! [`PolarLowsError::ArchiveIOError`] carrying the archive path.
use std::{fs::File, sync::Arc};

use arrow_array::{
    Array, ArrayRef, Float64Array, Int32Array, Int64Array, RecordBatch, StringArray, UInt32Array,
};
use arrow_schema::{DataType, Field, Schema};
use camino::Utf8Path;
use parquet::arrow::{arrow_reader::ParquetRecordBatchReaderBuilder, ArrowWriter};
use tracing::debug;

use crate::{
    constants::{Categories, FastHashMap, Fixes, TrackIdx},
    polarlows_errors::PolarLowsError,
    time::{epoch_from_unix_seconds, unix_seconds},
};

use super::{Fix, Track, TrackRun};

const FIXED_COLUMNS: [&str; 6] = ["track_idx", "time", "lon", "lat", "vortex_type", "categories"];
pub(crate) const CATEGORY_SEPARATOR: char = ',';

/// Persistence back-end for [`TrackRun`]s.
pub trait ArchiveStore {
    /// File extension of the archives written by this store (without the dot).
    fn extension(&self) -> &str;

    /// Write `run` to `path`, replacing any existing file.
    fn to_archive(&self, run: &TrackRun, path: &Utf8Path) -> Result<(), PolarLowsError>;

    /// Read back a run written by [`ArchiveStore::to_archive`].
    fn from_archive(&self, path: &Utf8Path) -> Result<TrackRun, PolarLowsError>;
}

/// Apache Parquet archive store.
#[derive(Debug, Clone, Copy)]
pub struct ParquetArchive {
    /// Arrow reader batch size (rows).
    pub batch_size: usize,
}

impl Default for ParquetArchive {
    fn default() -> Self {
        ParquetArchive { batch_size: 8192 }
    }
}

fn as_archive_error(path: &Utf8Path) -> impl Fn(PolarLowsError) -> PolarLowsError + '_ {
    move |err| match err {
        err @ PolarLowsError::ArchiveIOError { .. } => err,
        other => PolarLowsError::archive(path, other),
    }
}

fn build_batch(run: &TrackRun) -> Result<RecordBatch, PolarLowsError> {
    let n_rows: usize = run.iter().map(Track::len).sum();
    let n_aux = run.aux_names().len();

    let mut track_idx = Vec::with_capacity(n_rows);
    let mut time = Vec::with_capacity(n_rows);
    let mut lon = Vec::with_capacity(n_rows);
    let mut lat = Vec::with_capacity(n_rows);
    let mut vortex_type = Vec::with_capacity(n_rows);
    let mut categories = Vec::with_capacity(n_rows);
    let mut aux: Vec<Vec<f64>> = vec![Vec::with_capacity(n_rows); n_aux];

    for track in run {
        if let Some(label) = track
            .categories()
            .iter()
            .find(|c| c.is_empty() || c.contains(CATEGORY_SEPARATOR))
        {
            return Err(PolarLowsError::InvalidParameter(format!(
                "label '{label}' of track {} cannot be archived",
                track.idx()
            )));
        }
        let joined = track.categories().join(",");

        for fix in track.fixes() {
            track_idx.push(track.idx());
            time.push(unix_seconds(&fix.time));
            lon.push(fix.lon);
            lat.push(fix.lat);
            vortex_type.push(fix.vortex_type);
            categories.push(joined.clone());
            for (column, value) in aux.iter_mut().zip(&fix.aux) {
                column.push(*value);
            }
        }
    }

    let mut fields = vec![
        Field::new("track_idx", DataType::UInt32, false),
        Field::new("time", DataType::Int64, false),
        Field::new("lon", DataType::Float64, false),
        Field::new("lat", DataType::Float64, false),
        Field::new("vortex_type", DataType::Int32, false),
        Field::new("categories", DataType::Utf8, false),
    ];
    fields.extend(
        run.aux_names()
            .iter()
            .map(|name| Field::new(name.as_str(), DataType::Float64, false)),
    );

    let mut columns: Vec<ArrayRef> = vec![
        Arc::new(UInt32Array::from(track_idx)),
        Arc::new(Int64Array::from(time)),
        Arc::new(Float64Array::from(lon)),
        Arc::new(Float64Array::from(lat)),
        Arc::new(Int32Array::from(vortex_type)),
        Arc::new(StringArray::from(categories)),
    ];
    columns.extend(
        aux.into_iter()
            .map(|values| Arc::new(Float64Array::from(values)) as ArrayRef),
    );

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> Result<&'a T, PolarLowsError> {
    let array = batch
        .column_by_name(name)
        .ok_or_else(|| PolarLowsError::InvalidParameter(format!("column '{name}' not found in archive")))?;
    if array.null_count() > 0 {
        return Err(PolarLowsError::InvalidParameter(format!(
            "column '{name}' contains null values"
        )));
    }
    array
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| PolarLowsError::InvalidParameter(format!("column '{name}' has an unexpected type")))
}

/// Track being rebuilt from archive rows.
struct PendingTrack {
    idx: TrackIdx,
    fixes: Fixes,
    categories: String,
}

impl ParquetArchive {
    fn write(&self, run: &TrackRun, path: &Utf8Path) -> Result<(), PolarLowsError> {
        let batch = build_batch(run)?;
        let file = File::create(path)?;
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
        writer.write(&batch)?;
        writer.close()?;
        Ok(())
    }

    fn read(&self, path: &Utf8Path) -> Result<TrackRun, PolarLowsError> {
        let file = File::open(path)?;
        let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
        let aux_names: Vec<String> = builder
            .schema()
            .fields()
            .iter()
            .map(|f| f.name().clone())
            .filter(|name| !FIXED_COLUMNS.contains(&name.as_str()))
            .collect();
        let reader = builder.with_batch_size(self.batch_size).build()?;

        let mut pending: Vec<PendingTrack> = Vec::new();
        let mut position: FastHashMap<TrackIdx, usize> = FastHashMap::default();

        for maybe_batch in reader {
            let batch = maybe_batch?;

            let idx_arr = column::<UInt32Array>(&batch, "track_idx")?;
            let time_arr = column::<Int64Array>(&batch, "time")?;
            let lon_arr = column::<Float64Array>(&batch, "lon")?;
            let lat_arr = column::<Float64Array>(&batch, "lat")?;
            let vortex_arr = column::<Int32Array>(&batch, "vortex_type")?;
            let cat_arr = column::<StringArray>(&batch, "categories")?;
            let aux_arrs = aux_names
                .iter()
                .map(|name| column::<Float64Array>(&batch, name))
                .collect::<Result<Vec<_>, _>>()?;

            for row in 0..batch.num_rows() {
                let idx = idx_arr.value(row);
                let fix = Fix::new(
                    epoch_from_unix_seconds(time_arr.value(row)),
                    lon_arr.value(row),
                    lat_arr.value(row),
                    vortex_arr.value(row),
                )
                .with_aux(aux_arrs.iter().map(|arr| arr.value(row)));

                let slot = *position.entry(idx).or_insert_with(|| {
                    pending.push(PendingTrack {
                        idx,
                        fixes: Fixes::new(),
                        categories: cat_arr.value(row).to_string(),
                    });
                    pending.len() - 1
                });
                pending[slot].fixes.push(fix);
            }
        }

        let tracks = pending
            .into_iter()
            .map(|p| {
                let mut track = Track::new(p.idx, p.fixes)?;
                let labels: Categories = p
                    .categories
                    .split(CATEGORY_SEPARATOR)
                    .filter(|c| !c.is_empty())
                    .map(str::to_string)
                    .collect();
                labels.iter().for_each(|label| track.add_category(label));
                Ok(track)
            })
            .collect::<Result<Vec<_>, PolarLowsError>>()?;

        TrackRun::from_tracks(aux_names, tracks)
    }
}

impl ArchiveStore for ParquetArchive {
    fn extension(&self) -> &str {
        "parquet"
    }

    fn to_archive(&self, run: &TrackRun, path: &Utf8Path) -> Result<(), PolarLowsError> {
        self.write(run, path).map_err(as_archive_error(path))?;
        debug!(path = %path, n_tracks = run.len(), "archive written");
        Ok(())
    }

    fn from_archive(&self, path: &Utf8Path) -> Result<TrackRun, PolarLowsError> {
        let run = self.read(path).map_err(as_archive_error(path))?;
        debug!(path = %path, n_tracks = run.len(), "archive loaded");
        Ok(run)
    }
}

impl TrackRun {
    /// Write this run with the default [`ParquetArchive`] store.
    pub fn to_archive(&self, path: &Utf8Path) -> Result<(), PolarLowsError> {
        ParquetArchive::default().to_archive(self, path)
    }

    /// Read a run with the default [`ParquetArchive`] store.
    pub fn from_archive(path: &Utf8Path) -> Result<Self, PolarLowsError> {
        ParquetArchive::default().from_archive(path)
    }
}
