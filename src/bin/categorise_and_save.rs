//! Categorise the tracks of a set of tracker runs and save them to archives.
//!
//! ```text
//! categorise_and_save --name era5 --runs 0-9 [--lonlat -25,55,64,86] [--progressbar]
//! ```
//!
//! Reading the land-sea mask (`lsm.nc`) needs the `netcdf` cargo feature, which is
//! off by default:
//!
//! ```text
//! cargo run --release --features netcdf --bin categorise_and_save -- --name era5 --runs 0
//! ```
//!
//! Without it the binary stops with a mask read error before touching any track.
use anyhow::{bail, Context};
use camino::Utf8PathBuf;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use polarlows::{
    config::{Dataset, PipelineConfig},
    geodesy::BoundingBox,
    pipeline::{runs::parse_runs, PipelineDriver},
};

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Categorise cyclone tracks and save them to archives",
    long_about = "Categorise cyclone tracks and save them to archives.\n\n\
                  Reading the land-sea mask (lsm.nc) requires building with `--features netcdf`."
)]
struct Cli {
    /// Reanalysis the tracks were computed on
    #[arg(long, value_enum)]
    name: Dataset,

    /// Runs to process: `a,b,c` or `a-b` (inclusive)
    #[arg(long)]
    runs: String,

    /// Domain `lon0,lon1,lat0,lat1` used to crop the land-sea mask
    #[arg(long, allow_hyphen_values = true, value_parser = parse_bbox)]
    lonlat: Option<BoundingBox>,

    /// Show a progress bar
    #[arg(long)]
    progressbar: bool,

    /// JSON configuration file (built-in defaults otherwise)
    #[arg(long)]
    config: Option<Utf8PathBuf>,
}

fn parse_bbox(s: &str) -> Result<BoundingBox, String> {
    s.parse::<BoundingBox>().map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    let config = PipelineConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let runs = parse_runs(&cli.runs)?;
    let bbox = cli.lonlat.unwrap_or(config.bbox);
    info!(dataset = %cli.name, ?runs, %bbox, "categorise and save");

    let driver = PipelineDriver::new(config).progressbar(cli.progressbar);
    let summary = driver
        .categorise_and_save(cli.name, &runs, &bbox)
        .with_context(|| format!("categorising {} runs", cli.name))?;

    info!(n_archives = summary.written.len(), n_failed = summary.failed.len(), "done");
    if !summary.is_success() {
        let failed: Vec<u32> = summary.failed.iter().map(|f| f.run).collect();
        bail!("{} run(s) failed: {failed:?}", failed.len());
    }
    Ok(())
}
