//! CLI entry point for the ride_star analytics pipeline.
//!
//! Provides subcommands for running the full star-schema pipeline,
//! validating an input header, and logging the KPI catalog.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ride_star::config::PipelineConfig;
use ride_star::kpi::KpiCatalog;
use ride_star::loader::{load_rides, validate_schema};
use ride_star::pipeline;
use ride_star::schema::build_fact_table;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ride_star")]
#[command(about = "Builds a star schema and KPI catalog from a ride table", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline and write the workbook and insight documents
    Run {
        /// Ride table CSV
        #[arg(short, long, default_value = "Dataset.csv")]
        input: PathBuf,

        /// Directory receiving data_model/ and insights/
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// Optional JSON pipeline config (falls back to RIDE_STAR_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check that the input carries every required column
    Validate {
        /// Ride table CSV
        #[arg(short, long, default_value = "Dataset.csv")]
        input: PathBuf,
    },
    /// Compute the KPI catalog and log it as JSON
    Kpis {
        /// Ride table CSV
        #[arg(short, long, default_value = "Dataset.csv")]
        input: PathBuf,

        /// Optional JSON pipeline config (falls back to RIDE_STAR_CONFIG)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ride_star.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ride_star.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            output_dir,
            config,
        } => {
            let config = load_config(config)?;
            let output = pipeline::run(&input, &output_dir, &config)
                .with_context(|| format!("pipeline failed for {}", input.display()))?;

            for file in &output.files {
                info!(path = %file.display(), "Wrote");
            }
        }
        Commands::Validate { input } => {
            validate_schema(&input)
                .with_context(|| format!("schema check failed for {}", input.display()))?;
            info!(input = %input.display(), "All required columns present");
        }
        Commands::Kpis { input, config } => {
            let config = load_config(config)?;
            let rides = load_rides(&input)?;
            let fact = build_fact_table(&rides, config.minutes_per_km);
            let kpis = KpiCatalog::compute(&fact, &config);

            info!("{}", serde_json::to_string_pretty(&kpis)?);
        }
    }

    Ok(())
}

/// Loads the pipeline config from `--config`, then `RIDE_STAR_CONFIG`, else
/// uses the defaults.
fn load_config(path: Option<PathBuf>) -> Result<PipelineConfig> {
    let path = path.or_else(|| std::env::var_os("RIDE_STAR_CONFIG").map(PathBuf::from));

    match path {
        Some(path) => {
            let config = PipelineConfig::load(&path)?;
            info!(path = %path.display(), "Loaded pipeline config");
            Ok(config)
        }
        None => Ok(PipelineConfig::default()),
    }
}
