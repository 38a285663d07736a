//! # Pipeline driver
//!
//! The two top-level flows of the polar-low study.
//!
//! ## Categorise and save
//! -----------------
//! For each run of a dataset: load the raw tracks of every winter, categorise each non-empty
//! winter with the dataset land-sea mask, concatenate the winters and write the aggregate to
//! `{procdir}/{dataset}_run{run:03}_{period}.{ext}` (`ext` is provided by the
//! [`ArchiveStore`]).
//!
//! ## Match to observations
//! -----------------
//! For each dataset, each run of its run grid and each [`MatchConfig`]: load the archive,
//! slice it to every matching winter (`YYYY-10-01` to `YYYY-04-30`), match its categorised
//! subset against the observed tracks and write
//! `{procdir}/matches/{dataset}_run{run:03}_{period}_{label}.txt`:
//!
//! ```text
//! # era5
//! # 007
//! # 2000_2018
//! # method=bs2000_beta=25
//! 12,345
//! ```
//!
//! One `candidate_idx,N` line per pair, `N` being the catalogue id of the observation.
//!
//! ## Error Handling
//! -----------------
//! A failing (dataset, run) iteration is logged at `error` level and recorded in the
//! [`PipelineSummary`]; the driver moves on to the next run. Loading the mask or the
//! observations is fatal. An empty winter is a `warn` event and contributes no track.
use std::{
    fs::File,
    io::{BufWriter, Write},
};

use camino::{Utf8Path, Utf8PathBuf};
use tracing::{debug, error, info, warn};

use crate::{
    categorise::polar_low_conditions,
    config::{Dataset, PipelineConfig},
    constants::{ObsId, TrackIdx},
    geodesy::BoundingBox,
    land_mask::{netcdf_reader, LandSeaMask},
    matching::MatchConfig,
    observations::{accacia_reader, prepare_tracks, stars_reader, ObsTrack},
    polarlows_errors::PolarLowsError,
    time::winter_dates,
    tracks::{
        archive::{ArchiveStore, ParquetArchive},
        TrackRun,
    },
};

pub mod progress_bar;
pub mod runs;

use progress_bar::Progress;

/// Observational catalogue used as reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObsCatalogue {
    Stars,
    Accacia,
}

/// A (dataset, run) iteration that failed.
#[derive(Debug)]
pub struct RunFailure {
    pub dataset: Dataset,
    pub run: u32,
    pub error: PolarLowsError,
}

/// Outcome of a driver flow.
#[derive(Debug, Default)]
pub struct PipelineSummary {
    /// Archives or reports written, in processing order.
    pub written: Vec<Utf8PathBuf>,
    pub failed: Vec<RunFailure>,
}

impl PipelineSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    fn record(&mut self, dataset: Dataset, run: u32, outcome: Result<Vec<Utf8PathBuf>, PolarLowsError>) {
        match outcome {
            Ok(paths) => self.written.extend(paths),
            Err(e) => {
                error!(%dataset, run, error = %e, "run failed");
                self.failed.push(RunFailure {
                    dataset,
                    run,
                    error: e,
                });
            }
        }
    }
}

/// Runs the pipeline flows with a read-only configuration and an archive store.
pub struct PipelineDriver<S: ArchiveStore = ParquetArchive> {
    config: PipelineConfig,
    store: S,
    progressbar: bool,
}

impl PipelineDriver<ParquetArchive> {
    pub fn new(config: PipelineConfig) -> Self {
        PipelineDriver::with_store(config, ParquetArchive::default())
    }
}

impl<S: ArchiveStore> PipelineDriver<S> {
    pub fn with_store(config: PipelineConfig, store: S) -> Self {
        PipelineDriver {
            config,
            store,
            progressbar: false,
        }
    }

    /// Show progress bars (requires the `progress` feature).
    pub fn progressbar(mut self, enabled: bool) -> Self {
        self.progressbar = enabled;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// `{procdir}/{dataset}_run{run:03}_{period}.{ext}`
    pub fn archive_path(&self, dataset: Dataset, run: u32) -> Result<Utf8PathBuf, PolarLowsError> {
        Ok(self.config.procdir().join(format!(
            "{dataset}_run{run:03}_{}.{}",
            self.config.period()?,
            self.store.extension()
        )))
    }

    /// `{procdir}/matches/{dataset}_run{run:03}_{period}_{label}.txt`
    pub fn report_path(
        &self,
        dataset: Dataset,
        run: u32,
        match_config: &MatchConfig,
    ) -> Result<Utf8PathBuf, PolarLowsError> {
        Ok(self.config.procdir().join("matches").join(format!(
            "{dataset}_run{run:03}_{}_{}.txt",
            self.config.period()?,
            match_config.label()
        )))
    }

    /// Load the land-sea mask of `dataset`: longitudes shifted to `[-180, 180)`, cropped
    /// to `bbox`.
    pub fn load_mask(&self, dataset: Dataset, bbox: &BoundingBox) -> Result<LandSeaMask, PolarLowsError> {
        let path = self.config.mask_path(dataset);
        let mask = netcdf_reader::load(&path, Some(bbox), true)?;
        info!(%dataset, %path, shape = ?mask.shape(), "land-sea mask loaded");
        Ok(mask)
    }

    /// Categorise and archive the `runs` of `dataset` with the dataset mask cropped to
    /// `bbox`.
    pub fn categorise_and_save(
        &self,
        dataset: Dataset,
        runs: &[u32],
        bbox: &BoundingBox,
    ) -> Result<PipelineSummary, PolarLowsError> {
        let mask = self.load_mask(dataset, bbox)?;
        Ok(self.categorise_and_save_with_mask(dataset, runs, &mask))
    }

    /// Same as [`PipelineDriver::categorise_and_save`] with an already loaded mask.
    pub fn categorise_and_save_with_mask(
        &self,
        dataset: Dataset,
        runs: &[u32],
        mask: &LandSeaMask,
    ) -> PipelineSummary {
        let mut summary = PipelineSummary::default();
        let mut progress = Progress::new(runs.len(), self.progressbar, "runs");
        for &run in runs {
            let outcome = self.categorise_run(dataset, run, mask).map(|p| vec![p]);
            summary.record(dataset, run, outcome);
            progress.inc();
        }
        progress.finish();
        summary
    }

    /// Categorise every winter of one run and write the aggregate archive.
    pub fn categorise_run(
        &self,
        dataset: Dataset,
        run: u32,
        mask: &LandSeaMask,
    ) -> Result<Utf8PathBuf, PolarLowsError> {
        let conditions = polar_low_conditions(mask, &self.config.categorise, &self.config.cat);
        let mut aggregate = TrackRun::default();

        for winter in &self.config.winters {
            let dir = self.config.track_dir(dataset, run, winter);
            info!(%dataset, run, %winter, path = %dir, "loading tracks");
            let mut winter_run = TrackRun::from_dir(&dir, &self.config.columns)?;
            if winter_run.is_empty() {
                warn!(%dataset, run, %winter, path = %dir, "empty track run, skipped");
                continue;
            }
            winter_run.categorise(&conditions, false);
            debug!(
                %dataset,
                run,
                %winter,
                n_tracks = winter_run.len(),
                n_cat = winter_run.size(Some(self.config.cat.as_str())),
                "winter categorised"
            );
            aggregate.append(winter_run)?;
        }

        let path = self.archive_path(dataset, run)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.store.to_archive(&aggregate, &path)?;
        info!(
            %dataset,
            run,
            %path,
            n_tracks = aggregate.len(),
            n_cat = aggregate.size(Some(self.config.cat.as_str())),
            "archive written"
        );
        Ok(path)
    }

    /// Read the reference catalogue and keep the tracks lasting at least 6 h.
    pub fn load_observations(&self, catalogue: ObsCatalogue) -> Result<Vec<ObsTrack>, PolarLowsError> {
        let all = match catalogue {
            ObsCatalogue::Stars => stars_reader::read_all(&self.config.starsdir())?,
            ObsCatalogue::Accacia => accacia_reader::read_all(&self.config.acctracks())?,
        };
        let n_all = all.len();
        let obs = prepare_tracks(all, None);
        info!(?catalogue, n_tracks = n_all, n_selected = obs.len(), "observations loaded");
        Ok(obs)
    }

    /// Match every run of every dataset of the run grids against `obs`.
    pub fn match_to_observations(
        &self,
        obs: &[ObsTrack],
        datasets: &[Dataset],
    ) -> Result<PipelineSummary, PolarLowsError> {
        if obs.is_empty() {
            return Err(PolarLowsError::MatchConfigError(
                "no observed track to match against".into(),
            ));
        }
        for option in &self.config.match_options {
            option.validate()?;
        }

        let procdir = self.config.procdir();
        std::fs::create_dir_all(procdir.join("matches"))?;

        let mut summary = PipelineSummary::default();
        for &dataset in datasets {
            let runs = runs::run_grid(&procdir, dataset, self.config.nruns)?;
            let mut progress = Progress::new(runs.len(), self.progressbar, dataset.name());
            for run in runs {
                let outcome = self.match_run(dataset, run, obs);
                summary.record(dataset, run, outcome);
                progress.inc();
            }
            progress.finish();
        }
        Ok(summary)
    }

    /// Match one archived run for every configured [`MatchConfig`]; returns the reports.
    pub fn match_run(
        &self,
        dataset: Dataset,
        run: u32,
        obs: &[ObsTrack],
    ) -> Result<Vec<Utf8PathBuf>, PolarLowsError> {
        let archive = self.archive_path(dataset, run)?;
        let track_run = self.store.from_archive(&archive)?;
        info!(%dataset, run, path = %archive, n_tracks = track_run.len(), "archive loaded");

        let winters = self
            .config
            .match_winter_list()
            .iter()
            .map(|w| {
                let (start, end) = winter_dates(w)?;
                Ok((w.as_str(), track_run.time_slice(&start, &end)?))
            })
            .collect::<Result<Vec<_>, PolarLowsError>>()?;

        let mut reports = Vec::with_capacity(self.config.match_options.len());
        for match_config in &self.config.match_options {
            let mut pairs: Vec<(TrackIdx, ObsId)> = Vec::new();
            for (winter, sliced) in &winters {
                let matched = sliced.match_tracks(obs, Some(self.config.cat.as_str()), match_config)?;
                info!(%dataset, run, %winter, config = %match_config, n_pairs = matched.len(), "winter matched");
                pairs.extend(matched.iter().map(|p| (p.candidate, obs[p.reference].n())));
            }

            let path = self.report_path(dataset, run, match_config)?;
            self.write_report(&path, dataset, run, match_config, &pairs)?;
            reports.push(path);
        }
        Ok(reports)
    }

    fn write_report(
        &self,
        path: &Utf8Path,
        dataset: Dataset,
        run: u32,
        match_config: &MatchConfig,
        pairs: &[(TrackIdx, ObsId)],
    ) -> Result<(), PolarLowsError> {
        let mut out = BufWriter::new(File::create(path)?);
        writeln!(out, "# {dataset}")?;
        writeln!(out, "# {run:03}")?;
        writeln!(out, "# {}", self.config.period()?)?;
        writeln!(out, "# {}", match_config.label())?;
        for (candidate, n) in pairs {
            writeln!(out, "{candidate},{n}")?;
        }
        out.flush()?;
        debug!(%path, n_pairs = pairs.len(), "match report written");
        Ok(())
    }
}
