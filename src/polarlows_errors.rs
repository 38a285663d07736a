use camino::Utf8PathBuf;
use thiserror::Error;

use crate::observations::ParseCatalogueError;

#[derive(Error, Debug)]
pub enum PolarLowsError {
    #[error("Unable to read land-sea mask: {0}")]
    MaskReadError(String),

    #[error("Error parsing observational catalogue {path} (line {line}): {source}")]
    CatalogueParseError {
        path: Utf8PathBuf,
        line: usize,
        #[source]
        source: ParseCatalogueError,
    },

    #[error("Archive I/O error at {path}: {reason}")]
    ArchiveIOError { path: Utf8PathBuf, reason: String },

    #[error("Invalid match configuration: {0}")]
    MatchConfigError(String),

    #[error("Error reading track file {path} (line {line}): {reason}")]
    TrackParseError {
        path: Utf8PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    ArrowError(#[from] arrow_schema::ArrowError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[cfg(feature = "netcdf")]
    #[error("NetCDF error: {0}")]
    NetCDFError(#[from] netcdf::Error),
}

impl PolarLowsError {
    /// Wrap an error raised while reading or writing an archive, keeping the path.
    pub(crate) fn archive(path: impl Into<Utf8PathBuf>, reason: impl ToString) -> Self {
        PolarLowsError::ArchiveIOError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl PartialEq for PolarLowsError {
    fn eq(&self, other: &Self) -> bool {
        use PolarLowsError::*;
        match (self, other) {
            (MaskReadError(a), MaskReadError(b)) => a == b,
            (
                CatalogueParseError {
                    path: pa,
                    line: la,
                    source: sa,
                },
                CatalogueParseError {
                    path: pb,
                    line: lb,
                    source: sb,
                },
            ) => pa == pb && la == lb && sa == sb,
            (
                ArchiveIOError {
                    path: pa,
                    reason: ra,
                },
                ArchiveIOError {
                    path: pb,
                    reason: rb,
                },
            ) => pa == pb && ra == rb,
            (MatchConfigError(a), MatchConfigError(b)) => a == b,
            (
                TrackParseError {
                    path: pa,
                    line: la,
                    reason: ra,
                },
                TrackParseError {
                    path: pb,
                    line: lb,
                    reason: rb,
                },
            ) => pa == pb && la == lb && ra == rb,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,

            // Not comparable: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (ParquetError(_), ParquetError(_)) => true,
            (ArrowError(_), ArrowError(_)) => true,
            (JsonError(_), JsonError(_)) => true,
            (CsvError(_), CsvError(_)) => true,
            #[cfg(feature = "netcdf")]
            (NetCDFError(_), NetCDFError(_)) => true,

            _ => false,
        }
    }
}
