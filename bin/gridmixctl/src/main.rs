//! ---
//! ems_section: "05-networking-external-interfaces"
//! ems_subsection: "binary"
//! ems_type: "source"
//! ems_scope: "code"
//! ems_description: "Command line client for generation mix and carbon intensity series."
//! ems_version: "v0.0.0-prealpha"
//! ems_owner: "tbd"
//! ---
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use gridmix_common::{init_tracing, AppConfig};
use gridmix_core::{FixedClock, RangeSelector};
use gridmix_sources::{DataSource, SourceAdapter};
use tracing::{debug, info};

mod output;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Carbon intensity and generation mix series",
    long_about = None
)]
struct Cli {
    #[arg(long, value_name = "FILE", global = true, help = "Path to configuration file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    #[command(about = "Produce intensity and generation series for a range")]
    Series(SeriesArgs),
    #[command(about = "List data sources in fallback priority order")]
    Sources,
}

#[derive(Debug, Args)]
struct SeriesArgs {
    #[arg(long, help = "Time range: 24h, 48h or 7d")]
    range: Option<RangeSelector>,

    #[arg(long, help = "Data source: mock, eirgrid or entsoe")]
    source: Option<DataSource>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    #[arg(long, value_name = "FILE", help = "Write to FILE instead of stdout ('-' for stdout)")]
    output: Option<PathBuf>,

    #[arg(long, value_name = "RFC3339", help = "Reference time instead of the system clock")]
    now: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut candidates = Vec::new();
    if let Some(path) = &cli.config {
        candidates.push(path.clone());
    }
    candidates.push(PathBuf::from("configs/gridmix.toml"));

    let loaded = AppConfig::load_with_source(&candidates)?;
    let mut config = loaded.config;
    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    init_tracing("gridmixctl", &config.logging)?;
    match &loaded.source {
        Some(path) => debug!(config_path = %path.display(), "configuration loaded"),
        None => debug!("running with built-in configuration defaults"),
    }

    match cli.command {
        Commands::Series(args) => run_series(&config, args).await,
        Commands::Sources => run_sources(&config),
    }
}

async fn run_series(config: &AppConfig, args: SeriesArgs) -> Result<()> {
    let range = args.range.unwrap_or(config.default_range);
    let source = match args.source {
        Some(source) => source,
        None => config
            .default_source
            .parse()
            .context("invalid default_source in configuration")?,
    };

    let mut adapter = SourceAdapter::new(config.sources.clone())?;
    if let Some(now) = args.now {
        adapter = adapter.with_clock(Arc::new(FixedClock(now)));
    }

    let report = adapter
        .generate_report(source, range)
        .await
        .with_context(|| format!("failed to produce {range} series from {source}"))?;
    info!(
        source = source.id(),
        range = %range,
        origin = report.series.origin.as_str(),
        synthetic = report.series.origin.is_synthetic(),
        "writing series"
    );

    let mut writer = output::open(args.output.as_deref())?;
    match args.format {
        OutputFormat::Json => output::write_json(&mut writer, &report)?,
        OutputFormat::Csv => output::write_csv(&mut writer, &report.series)?,
    }
    writer.flush()?;
    Ok(())
}

fn run_sources(config: &AppConfig) -> Result<()> {
    let adapter = SourceAdapter::new(config.sources.clone())?;
    for source in DataSource::PRIORITY {
        let state = if adapter.is_enabled(source) {
            "enabled"
        } else {
            "disabled"
        };
        let timing = match adapter.timing(source) {
            Some((timeout, refresh)) => format!(
                "timeout={}ms refresh={}s",
                timeout.as_millis(),
                refresh.as_secs()
            ),
            None => "offline".to_owned(),
        };
        println!(
            "{:<8} {:<22} {:<9} {}",
            source.id(),
            source.label(),
            state,
            timing
        );
    }
    Ok(())
}
