use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::path::PathBuf;
use std::time::Duration;
use taxi_weather_etl::schedule::default_ledger_path;
use taxi_weather_etl::{IdempotencyKey, Pipeline, PipelineConfig, RetryPolicy, RunOutcome};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Batch ETL joining taxi trips with zones and hourly weather", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Transform then load, guarded by the run ledger and retried on failure
    Run(RunArgs),
    /// Clean, enrich and stage the sources
    Transform(PathArgs),
    /// Load the staged parquet files into the database
    Load(PathArgs),
}

#[derive(Args, Debug)]
struct PathArgs {
    /// Root of the conventional data layout
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
    /// Directory of trip parquet files
    #[arg(long)]
    trip_dir: Option<PathBuf>,
    /// Zone lookup CSV
    #[arg(long)]
    zone_csv: Option<PathBuf>,
    /// Weather JSON document
    #[arg(long)]
    weather_json: Option<PathBuf>,
    /// Staging directory, replaced on every transform
    #[arg(long)]
    staging_dir: Option<PathBuf>,
    /// Database file, replaced on every load
    #[arg(long)]
    database: Option<PathBuf>,
    /// Destination table
    #[arg(long)]
    table: Option<String>,
}

#[derive(Args, Debug)]
struct RunArgs {
    #[command(flatten)]
    paths: PathArgs,
    /// Idempotency key, today's date (YYYY-MM-DD) when omitted
    #[arg(long)]
    key: Option<IdempotencyKey>,
    /// Run even if the key completed recently
    #[arg(long)]
    force: bool,
    /// Extra attempts per stage
    #[arg(long, default_value_t = 2)]
    retries: u32,
    /// Seconds to wait between attempts
    #[arg(long, default_value_t = 5)]
    retry_delay_secs: u64,
    /// Ledger file, defaults to the user cache directory
    #[arg(long, conflicts_with = "no_ledger")]
    ledger: Option<PathBuf>,
    /// Do not consult or update the run ledger
    #[arg(long)]
    no_ledger: bool,
}

impl PathArgs {
    fn into_config(self) -> PipelineConfig {
        let mut config = PipelineConfig::from_data_dir(&self.data_dir);
        if let Some(p) = self.trip_dir {
            config.trip_dir = p;
        }
        if let Some(p) = self.zone_csv {
            config.zone_csv = p;
        }
        if let Some(p) = self.weather_json {
            config.weather_json = p;
        }
        if let Some(p) = self.staging_dir {
            config.staging_dir = p;
        }
        if let Some(p) = self.database {
            config.database_path = p;
        }
        if let Some(t) = self.table {
            config.table_name = t;
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => {
            let pipeline = Pipeline::new(args.paths.into_config());
            let ledger_path = match (args.no_ledger, args.ledger) {
                (true, _) => None,
                (false, Some(path)) => Some(path),
                (false, None) => {
                    Some(default_ledger_path().context("Could not resolve the run ledger path")?)
                }
            };
            let outcome = pipeline
                .run()
                .key(args.key.unwrap_or_else(IdempotencyKey::today))
                .maybe_ledger_path(ledger_path)
                .retry(RetryPolicy::new(
                    args.retries,
                    Duration::from_secs(args.retry_delay_secs),
                ))
                .force(args.force)
                .call()
                .await?;
            match outcome {
                RunOutcome::Skipped { key, completed_at } => {
                    println!("Run {key} already completed at {completed_at}, nothing to do");
                }
                RunOutcome::Completed { transform, load } => {
                    println!(
                        "Staged {} rows ({} trips rejected) at {}",
                        transform.output_rows,
                        transform.rejected_trips,
                        transform.staging_dir.display()
                    );
                    print!("{load}");
                }
            }
        }
        Command::Transform(paths) => {
            let pipeline = Pipeline::new(paths.into_config());
            let report = pipeline.transform().await?;
            println!(
                "Staged {} rows x {} columns in {} file(s) at {}",
                report.output_rows,
                report.output_columns,
                report.staged_files.len(),
                report.staging_dir.display()
            );
        }
        Command::Load(paths) => {
            let pipeline = Pipeline::new(paths.into_config());
            let report = pipeline.load().await?;
            print!("{report}");
        }
    }

    info!("Done");
    Ok(())
}
