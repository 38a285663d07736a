//! Match the categorised tracks of every run to an observational polar-low catalogue.
//!
//! ```text
//! match_to_obs [--datasets era5,interim] [--accacia] [--progressbar]
//! ```
use anyhow::{bail, Context};
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use polarlows::{
    config::{Dataset, PipelineConfig},
    pipeline::{ObsCatalogue, PipelineDriver},
};

#[derive(Debug, Parser)]
#[command(version, about = "Match categorised tracks to observed polar lows")]
struct Cli {
    /// Datasets to process (configured list otherwise)
    #[arg(long, value_enum, value_delimiter = ',')]
    datasets: Vec<Dataset>,

    /// Match against ACCACIA instead of STARS
    #[arg(long)]
    accacia: bool,

    /// Show progress bars
    #[arg(long)]
    progressbar: bool,

    /// JSON configuration file (built-in defaults otherwise)
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let datasets = if cli.datasets.is_empty() {
        config.datasets.clone()
    } else {
        cli.datasets
    };
    let catalogue = if cli.accacia {
        ObsCatalogue::Accacia
    } else {
        ObsCatalogue::Stars
    };

    let driver = PipelineDriver::new(config).progressbar(cli.progressbar);
    let obs = driver
        .load_observations(catalogue)
        .context("loading observations")?;
    info!(?catalogue, n_ref = obs.len(), ?datasets, "match to observations");

    let summary = driver.match_to_observations(&obs, &datasets)?;

    info!(n_reports = summary.written.len(), n_failed = summary.failed.len(), "done");
    if !summary.is_success() {
        let failed: Vec<String> = summary
            .failed
            .iter()
            .map(|f| format!("{}/run{:03}", f.dataset, f.run))
            .collect();
        bail!("{} run(s) failed: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}
