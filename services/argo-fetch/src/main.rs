//! Argo float data fetch tool.
//!
//! Fetches Argo profiles either from the Argovis API or from a local copy
//! of the GDAC FTP tree, flattens them into a point collection and prints a
//! JSON summary (optionally writing the whole collection to a file).

mod config;
mod output;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use argo_common::{
    ArgoFetcher, DataMode, Dataset, DatasetKind, ErrorMode, FloatRequest, NameMode,
    PressureRange, Region, Shape,
};
use argovis_client::{ArgovisClient, RemoteRegionFetcher, RemoteWmoFetcher};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use gdac_local::{
    DatasetCache, LocalBoxFetcher, LocalWmoFetcher, ParallelMapper, RayonMapper,
    VariableSelection,
};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use config::AppConfig;
use output::Summary;

#[derive(Parser, Debug)]
#[command(name = "argo-fetch")]
#[command(about = "Fetch Argo float data from Argovis or a local GDAC mirror")]
struct Args {
    /// Configuration file
    #[arg(long, env = "ARGO_FETCH_CONFIG")]
    config: Option<PathBuf>,

    /// Argovis base URL
    #[arg(long, env = "ARGOVIS_URL")]
    argovis_url: Option<String>,

    /// Root of the local GDAC mirror
    #[arg(long, env = "ARGO_FTP_ROOT")]
    ftp_root: Option<PathBuf>,

    /// Directory of the local dataset cache
    #[arg(long, env = "ARGO_CACHE_DIR")]
    cache_dir: Option<PathBuf>,

    /// Write the fetched collection to this JSON file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(flatten)]
    Remote(RemoteCommand),

    /// Floats from the local GDAC mirror
    Local {
        #[command(subcommand)]
        command: LocalCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RemoteCommand {
    /// One profile from Argovis
    Profile { wmo: u32, cycle: u32 },

    /// Floats from Argovis, optionally narrowed to some cycles
    Float {
        #[arg(required = true)]
        wmos: Vec<u32>,
        #[arg(long, value_delimiter = ',')]
        cycles: Vec<u32>,
        /// Pressure range "lower,upper", only used with cycles
        #[arg(long, value_parser = parse_pressure)]
        pres: Option<PressureRange>,
        #[arg(long, default_value = "phy")]
        dataset: DatasetKind,
        /// Keep only profiles in this data mode (R, A or D)
        #[arg(long)]
        data_mode: Option<DataMode>,
        /// Keep only profiles with this position QC flag
        #[arg(long)]
        position_qc: Option<i64>,
        /// Measurement keys to drop
        #[arg(long, value_delimiter = ',')]
        drop: Vec<String>,
    },

    /// Profiles from Argovis inside a polygon and date window
    Region {
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
        /// Polygon as JSON, e.g. [[[-60,20],[-50,20],[-50,30],[-60,20]]]
        #[arg(long, value_parser = parse_shape)]
        shape: Shape,
        #[arg(long, value_parser = parse_pressure)]
        pres: Option<PressureRange>,
        /// Only deep profiles
        #[arg(long)]
        deep: bool,
        /// Only profiles carrying BGC measurements; implied by --dataset bgc
        #[arg(long)]
        bgc_only: bool,
        #[arg(long, default_value = "phy")]
        dataset: DatasetKind,
    },
}

#[derive(Subcommand, Debug)]
enum LocalCommand {
    /// Resolve files from the float folders
    Wmo {
        #[arg(required = true)]
        wmos: Vec<u32>,
        #[arg(long, value_delimiter = ',')]
        cycles: Vec<u32>,
        /// Skip files that cannot be found instead of failing
        #[arg(long)]
        ignore_missing: bool,
        #[command(flatten)]
        common: LocalArgs,
    },

    /// Look floats up in the index of every multi-profile file
    #[command(name = "box")]
    Index {
        #[arg(required = true)]
        wmos: Vec<u32>,
        /// Load only this many randomly drawn floats
        #[arg(long)]
        sample: Option<usize>,
        #[command(flatten)]
        common: LocalArgs,
    },

    /// Remove every cached collection
    ClearCache,
}

#[derive(clap::Args, Debug)]
struct LocalArgs {
    /// Dataset kind (defaults to the config file value)
    #[arg(long)]
    dataset: Option<DatasetKind>,
    /// Load floats in parallel
    #[arg(long)]
    parallel: bool,
    /// Keep only the standard Argo variables
    #[arg(long)]
    standard_only: bool,
}

fn parse_pressure(s: &str) -> Result<PressureRange, String> {
    PressureRange::from_pair_string(s).map_err(|e| e.to_string())
}

fn parse_shape(s: &str) -> Result<Shape, String> {
    Shape::from_json(s).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json)?;

    let config = AppConfig::load_or_default(args.config.as_deref())?.with_overrides(
        args.argovis_url.clone(),
        args.ftp_root.clone(),
        args.cache_dir.clone(),
    )?;

    match args.command {
        Command::Local { command } => run_local(&config, command, args.output.as_deref()),
        Command::Remote(command) => run_remote(&config, command, args.output.as_deref()).await,
    }
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr);

    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

async fn run_remote(config: &AppConfig, command: RemoteCommand, output: Option<&Path>) -> Result<()> {
    let client = Arc::new(
        ArgovisClient::new(config.client_config()).context("Failed to build Argovis client")?,
    );
    info!(base_url = %client.base_url(), "Querying Argovis");

    let (fetcher, request, ds) = match command {
        RemoteCommand::Profile { wmo, cycle } => {
            let profile = client.get_profile(wmo, cycle).await?;
            let ds = argovis_client::to_dataset(&[profile])?;
            let request = format!("WMO{}_CYC{:04}", wmo, cycle);
            ("Argovis Argo data fetcher for a profile".to_string(), request, ds)
        }
        RemoteCommand::Float {
            wmos,
            cycles,
            pres,
            dataset,
            data_mode,
            position_qc,
            drop,
        } => {
            let mut request = FloatRequest::new(wmos)?;
            if !cycles.is_empty() {
                request = request.with_cycles(cycles);
            }
            let mut fetcher = RemoteWmoFetcher::new(client, request, dataset);
            if let Some(pres) = pres {
                fetcher = fetcher.with_pressure(pres);
            }

            let mut profiles = fetcher.fetch_profiles().await?;
            if let Some(mode) = data_mode {
                profiles = argovis_client::filter_data_mode(&profiles, mode);
            }
            if let Some(qc) = position_qc {
                profiles = argovis_client::filter_qc(&profiles, "position_qc", qc);
            }
            if !drop.is_empty() {
                let keys: Vec<&str> = drop.iter().map(String::as_str).collect();
                profiles = argovis_client::filter_variables(&profiles, &keys);
            }
            info!(profiles = profiles.len(), "Profiles after filtering");

            let ds = argovis_client::to_dataset(&profiles)?;
            (
                fetcher.definition().to_string(),
                fetcher.cname(NameMode::Display),
                ds,
            )
        }
        RemoteCommand::Region {
            start,
            end,
            shape,
            pres,
            deep,
            bgc_only,
            dataset,
        } => {
            let mut region = Region::new(start, end, shape);
            region.deep_only = deep;
            region.bgc_only = bgc_only;
            if let Some(pres) = pres {
                region = region.with_pressure(pres);
            }
            let fetcher = RemoteRegionFetcher::new(client, region, dataset);
            let ds = fetcher.to_dataset().await?;
            (
                fetcher.definition().to_string(),
                fetcher.cname(NameMode::Display),
                ds,
            )
        }
    };

    finish(&fetcher, request, Some(ds), output)
}

fn run_local(config: &AppConfig, command: LocalCommand, output: Option<&Path>) -> Result<()> {
    let (describe, definition, request, ds) = match command {
        LocalCommand::Wmo {
            wmos,
            cycles,
            ignore_missing,
            common,
        } => {
            let options = config.local_options(common.dataset)?;
            let mut request = FloatRequest::new(wmos)?;
            if !cycles.is_empty() {
                request = request.with_cycles(cycles);
            }
            let errors = if ignore_missing {
                ErrorMode::Ignore
            } else {
                ErrorMode::Raise
            };
            let mut fetcher = LocalWmoFetcher::new(options, request)?.with_error_mode(errors);
            if let Some(mapper) = mapper(config, common.parallel)? {
                fetcher = fetcher.with_mapper(mapper);
            }
            let ds = fetcher.to_dataset()?;
            (
                fetcher.describe(),
                fetcher.definition().to_string(),
                fetcher.cname(NameMode::Display),
                post_process(ds, common.standard_only),
            )
        }
        LocalCommand::Index {
            wmos,
            sample,
            common,
        } => {
            let options = config.local_options(common.dataset)?;
            let mut fetcher = LocalBoxFetcher::new(options, wmos)?;
            if let Some(mapper) = mapper(config, common.parallel)? {
                fetcher = fetcher.with_mapper(mapper);
            }
            if let Some(n) = sample {
                fetcher = fetcher.with_sample_size(n);
            }
            let ds = fetcher.to_dataset()?;
            (
                fetcher.describe(),
                fetcher.definition().to_string(),
                fetcher.cname(NameMode::Display),
                post_process(ds, common.standard_only),
            )
        }
        LocalCommand::ClearCache => {
            let dir = config
                .local
                .cache_dir
                .as_ref()
                .context("no cache directory configured (set local.cache_dir, --cache-dir or ARGO_CACHE_DIR)")?;
            let removed = DatasetCache::new(dir)?.clear()?;
            info!(removed, dir = %dir.display(), "Cleared dataset cache");
            return Ok(());
        }
    };

    info!("{}", describe);
    finish(&definition, request, ds, output)
}

fn mapper(config: &AppConfig, parallel: bool) -> Result<Option<Arc<dyn ParallelMapper>>> {
    if !(parallel || config.local.parallel) {
        return Ok(None);
    }
    let mapper = match config.local.threads {
        Some(threads) => RayonMapper::with_threads(threads)?,
        None => RayonMapper::new(),
    };
    Ok(Some(Arc::new(mapper)))
}

fn post_process(ds: Option<Dataset>, standard_only: bool) -> Option<Dataset> {
    let selection = if standard_only {
        VariableSelection::Standard
    } else {
        VariableSelection::All
    };
    ds.map(gdac_local::filter_data_mode)
        .map(gdac_local::filter_qc)
        .map(|ds| gdac_local::filter_variables(ds, selection))
}

fn finish(
    fetcher: &str,
    request: String,
    ds: Option<Dataset>,
    output: Option<&Path>,
) -> Result<()> {
    let Some(ds) = ds else {
        return output::print_empty(fetcher, &request);
    };
    if let Some(path) = output {
        output::write_dataset(path, &ds)?;
        info!(path = %path.display(), points = ds.point_count(), "Wrote collection");
    }
    output::print_summary(&Summary::new(fetcher, request, &ds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_local_box() {
        let args = Args::try_parse_from([
            "argo-fetch",
            "--ftp-root",
            "/data/gdac",
            "local",
            "box",
            "3900737",
            "6902746",
            "--parallel",
            "--sample",
            "1",
        ])
        .unwrap();
        assert_eq!(args.ftp_root, Some(PathBuf::from("/data/gdac")));
        match args.command {
            Command::Local {
                command: LocalCommand::Index { wmos, sample, common },
            } => {
                assert_eq!(wmos, vec![3900737, 6902746]);
                assert_eq!(sample, Some(1));
                assert!(common.parallel);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_parse_float_filters() {
        let args = Args::try_parse_from([
            "argo-fetch",
            "float",
            "3900737",
            "--cycles",
            "1,2",
            "--pres",
            "0,50",
            "--data-mode",
            "d",
            "--drop",
            "psal,temp",
        ])
        .unwrap();
        match args.command {
            Command::Remote(RemoteCommand::Float {
                cycles,
                pres,
                data_mode,
                drop,
                ..
            }) => {
                assert_eq!(cycles, vec![1, 2]);
                assert_eq!(pres, Some(PressureRange::new(0.0, 50.0)));
                assert_eq!(data_mode, Some(DataMode::Delayed));
                assert_eq!(drop, vec!["psal", "temp"]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_region_rejects_bad_shape() {
        let result = Args::try_parse_from([
            "argo-fetch",
            "region",
            "--start",
            "2017-09-15",
            "--end",
            "2017-09-30",
            "--shape",
            "not json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_region_flags() {
        let args = Args::try_parse_from([
            "argo-fetch",
            "region",
            "--start",
            "2017-09-15",
            "--end",
            "2017-09-30",
            "--shape",
            "[[[-75,33],[-55,33],[-55,45],[-75,33]]]",
            "--bgc-only",
            "--deep",
        ])
        .unwrap();
        match args.command {
            Command::Remote(RemoteCommand::Region {
                bgc_only,
                deep,
                dataset,
                ..
            }) => {
                assert!(bgc_only);
                assert!(deep);
                assert_eq!(dataset, DatasetKind::Phy);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
