//! # Pipeline configuration
//!
//! A single read-only record, [`PipelineConfig`], injected into the pipeline driver. It holds
//! the study domain, the list of winters, the tracker column layout, the categorisation and
//! matching parameters and the filesystem roots.
//!
//! ## Loading
//! -----------------
//! * [`PipelineConfig::default`] – Built-in values of the study.
//! * [`PipelineConfig::from_json_file`] – JSON file, every field optional (missing fields take
//!   the default value).
//!
//! ## Paths
//! -----------------
//! Only `datadir` has a fixed default (`$HOME/phd`). The other roots default to locations
//! below it and are resolved by the accessors ([`PipelineConfig::trackresdir`], …), so
//! overriding `datadir` alone moves the whole tree.
use std::{fmt, ops::Range};

use camino::{Utf8Path, Utf8PathBuf};
use clap::ValueEnum;
use directories::BaseDirs;
use serde::{Deserialize, Serialize};

use crate::{
    categorise::CategoriseParams,
    constants::DEFAULT_CAT,
    geodesy::BoundingBox,
    matching::{default_match_options, MatchConfig},
    polarlows_errors::PolarLowsError,
    time::{period, winter_years},
    tracks::archive::CATEGORY_SEPARATOR,
};

/// Reanalysis a tracker run was computed on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Dataset {
    Era5,
    Interim,
}

impl Dataset {
    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Era5 => "era5",
            Dataset::Interim => "interim",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Dataset {
    type Err = PolarLowsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "era5" => Ok(Dataset::Era5),
            "interim" => Ok(Dataset::Interim),
            other => Err(PolarLowsError::InvalidParameter(format!(
                "unknown dataset '{other}' (expected era5 or interim)"
            ))),
        }
    }
}

fn default_winters() -> Vec<String> {
    (2000..2018).map(|y| format!("{}_{}", y, y + 1)).collect()
}

fn default_columns() -> Vec<String> {
    ["lon", "lat", "vo", "time", "area", "vortex_type", "slp"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_datadir() -> Utf8PathBuf {
    BaseDirs::new()
        .and_then(|b| Utf8PathBuf::from_path_buf(b.home_dir().to_path_buf()).ok())
        .unwrap_or_else(|| Utf8PathBuf::from("."))
        .join("phd")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Study domain, used to crop the masks and to select observations.
    pub bbox: BoundingBox,
    /// Ordered winters `"YYYY_YYYY"`.
    pub winters: Vec<String>,
    /// Column layout of the tracker output files.
    pub columns: Vec<String>,
    /// Categorisation label.
    pub cat: String,
    pub datasets: Vec<Dataset>,
    /// Number of runs when no run-grid file exists.
    pub nruns: u32,
    pub categorise: CategoriseParams,
    pub match_options: Vec<MatchConfig>,
    /// Positions in `winters` of the winters used by the matching phase.
    pub match_winters: Range<usize>,

    pub datadir: Utf8PathBuf,
    pub trackresdir: Option<Utf8PathBuf>,
    pub procdir: Option<Utf8PathBuf>,
    pub era5_dir: Option<Utf8PathBuf>,
    pub interim_dir: Option<Utf8PathBuf>,
    pub starsdir: Option<Utf8PathBuf>,
    pub acctracks: Option<Utf8PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            bbox: BoundingBox::default(),
            winters: default_winters(),
            columns: default_columns(),
            cat: DEFAULT_CAT.to_string(),
            datasets: vec![Dataset::Era5, Dataset::Interim],
            nruns: 1,
            categorise: CategoriseParams::default(),
            match_options: default_match_options(),
            match_winters: 1..11,
            datadir: default_datadir(),
            trackresdir: None,
            procdir: None,
            era5_dir: None,
            interim_dir: None,
            starsdir: None,
            acctracks: None,
        }
    }
}

impl PipelineConfig {
    /// Read a configuration from a JSON file and validate it.
    pub fn from_json_file(path: &Utf8Path) -> Result<Self, PolarLowsError> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_json::from_str(&content)?;
        config.validate()
    }

    /// The configuration of `path` if given, the built-in one otherwise.
    pub fn load(path: Option<&Utf8Path>) -> Result<Self, PolarLowsError> {
        match path {
            Some(path) => Self::from_json_file(path),
            None => Self::default().validate(),
        }
    }

    /// Check the winters, the categorisation label and thresholds and the match options.
    pub fn validate(self) -> Result<Self, PolarLowsError> {
        if self.winters.is_empty() {
            return Err(PolarLowsError::InvalidParameter(
                "at least one winter is required".into(),
            ));
        }
        for w in &self.winters {
            winter_years(w)?;
        }
        if self.columns.is_empty() {
            return Err(PolarLowsError::InvalidParameter(
                "the column layout is empty".into(),
            ));
        }
        if self.cat.trim().is_empty() || self.cat.contains(CATEGORY_SEPARATOR) {
            return Err(PolarLowsError::InvalidParameter(format!(
                "invalid categorisation label '{}' (must be non-empty, without '{CATEGORY_SEPARATOR}')",
                self.cat
            )));
        }
        BoundingBox::new(self.bbox.lon0, self.bbox.lon1, self.bbox.lat0, self.bbox.lat1)?;
        for option in &self.match_options {
            option.validate()?;
        }
        self.categorise.validate()?;
        Ok(self)
    }

    /// `"{first start year}_{last end year}"` of the configured winters.
    pub fn period(&self) -> Result<String, PolarLowsError> {
        period(&self.winters)
    }

    /// Winters of the matching phase (`winters[match_winters]`, clamped to the list).
    pub fn match_winter_list(&self) -> &[String] {
        let end = self.match_winters.end.min(self.winters.len());
        let start = self.match_winters.start.min(end);
        &self.winters[start..end]
    }

    pub fn trackresdir(&self) -> Utf8PathBuf {
        self.trackresdir
            .clone()
            .unwrap_or_else(|| self.datadir.join("pmc_tracking").join("results"))
    }

    pub fn procdir(&self) -> Utf8PathBuf {
        self.procdir
            .clone()
            .unwrap_or_else(|| self.trackresdir().join("processed_data"))
    }

    pub fn era5_dir(&self) -> Utf8PathBuf {
        self.era5_dir
            .clone()
            .unwrap_or_else(|| self.datadir.join("reanalysis").join("era5"))
    }

    pub fn interim_dir(&self) -> Utf8PathBuf {
        self.interim_dir
            .clone()
            .unwrap_or_else(|| self.datadir.join("reanalysis").join("interim"))
    }

    pub fn starsdir(&self) -> Utf8PathBuf {
        self.starsdir
            .clone()
            .unwrap_or_else(|| self.datadir.join("tracks").join("stars"))
    }

    pub fn acctracks(&self) -> Utf8PathBuf {
        self.acctracks.clone().unwrap_or_else(|| {
            self.datadir
                .join("tracks")
                .join("accacia")
                .join("pmc_loc_time_ch4_20Mar-02Apr.txt")
        })
    }

    /// `lsm.nc` of the reanalysis directory of `dataset`.
    pub fn mask_path(&self, dataset: Dataset) -> Utf8PathBuf {
        match dataset {
            Dataset::Era5 => self.era5_dir(),
            Dataset::Interim => self.interim_dir(),
        }
        .join("lsm.nc")
    }

    /// Raw tracker output of one (dataset, run, winter).
    pub fn track_dir(&self, dataset: Dataset, run: u32, winter: &str) -> Utf8PathBuf {
        self.trackresdir()
            .join(dataset.name())
            .join(format!("run{run:03}"))
            .join(winter)
    }
}

#[cfg(test)]
mod config_test {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.winters.len(), 18);
        assert_eq!(cfg.winters[0], "2000_2001");
        assert_eq!(cfg.period().unwrap(), "2000_2018");
        assert_eq!(cfg.match_winter_list().len(), 10);
        assert_eq!(cfg.match_winter_list()[0], "2001_2002");
        assert_eq!(cfg.cat, "pmc");
        assert_eq!(cfg.match_options.len(), 8);
        assert!(cfg.clone().validate().is_ok());
    }

    #[test]
    fn test_paths_follow_datadir() {
        let cfg: PipelineConfig = serde_json::from_str(r#"{"datadir": "/data"}"#).unwrap();
        assert_eq!(cfg.procdir(), "/data/pmc_tracking/results/processed_data");
        assert_eq!(cfg.mask_path(Dataset::Interim), "/data/reanalysis/interim/lsm.nc");
        assert_eq!(
            cfg.track_dir(Dataset::Era5, 7, "2005_2006"),
            "/data/pmc_tracking/results/era5/run007/2005_2006"
        );

        let cfg: PipelineConfig =
            serde_json::from_str(r#"{"datadir": "/data", "procdir": "/scratch/out"}"#).unwrap();
        assert_eq!(cfg.procdir(), "/scratch/out");
    }

    #[test]
    fn test_json_overrides_and_validation() {
        let cfg: PipelineConfig = serde_json::from_str(
            r#"{
                "winters": ["2008_2009", "2009_2010"],
                "datasets": ["interim"],
                "match_options": [{"method": "simple", "thresh_dist": 200.0}],
                "match_winters": {"start": 0, "end": 11}
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.datasets, vec![Dataset::Interim]);
        assert_eq!(cfg.match_winter_list().len(), 2);
        assert_eq!(cfg.period().unwrap(), "2008_2010");

        let bad: PipelineConfig = serde_json::from_str(r#"{"winters": ["2008-2009"]}"#).unwrap();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_category_label_is_checked_upfront() {
        for cat in ["", "  ", "pmc,strong"] {
            let cfg = PipelineConfig {
                cat: cat.to_string(),
                ..PipelineConfig::default()
            };
            assert!(
                matches!(cfg.validate(), Err(PolarLowsError::InvalidParameter(_))),
                "{cat:?}"
            );
        }
        let cfg = PipelineConfig {
            cat: "pmc_strict".to_string(),
            ..PipelineConfig::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_dataset_names() {
        assert_eq!("ERA5".parse::<Dataset>().unwrap(), Dataset::Era5);
        assert_eq!(Dataset::Interim.to_string(), "interim");
        assert!("merra".parse::<Dataset>().is_err());
    }
}
