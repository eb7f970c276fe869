//! Sequences the transform and load stages for one run.

use crate::config::PipelineConfig;
use crate::error::EtlError;
use crate::load::load_staging;
use crate::schedule::{default_ledger_ttl, run_with_retry, IdempotencyKey, RetryPolicy, RunLedger};
use crate::transform::run_transform;
use crate::types::reports::{LoadReport, TransformReport};
use bon::bon;
use chrono::{DateTime, TimeDelta, Utc};
use log::info;
use std::path::{Path, PathBuf};
use tokio::time::Instant;

/// What a scheduled run ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The key already completed within the ledger window.
    Skipped {
        key: IdempotencyKey,
        completed_at: DateTime<Utc>,
    },
    Completed {
        transform: TransformReport,
        load: LoadReport,
    },
}

/// Runs the two stages against one [`PipelineConfig`].
///
/// # Examples
///
/// ```no_run
/// use taxi_weather_etl::{IdempotencyKey, Pipeline, PipelineConfig, RunOutcome};
/// use std::path::Path;
///
/// # async fn run() -> Result<(), taxi_weather_etl::EtlError> {
/// let pipeline = Pipeline::new(PipelineConfig::from_data_dir(Path::new("data")));
/// let outcome = pipeline
///     .run()
///     .key(IdempotencyKey::today())
///     .call()
///     .await?;
/// if let RunOutcome::Completed { load, .. } = outcome {
///     println!("{load}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

#[bon]
impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Cleans and enriches the sources and stages the result.
    pub async fn transform(&self) -> Result<TransformReport, EtlError> {
        Ok(run_transform(&self.config).await?)
    }

    /// Loads the configured staging directory.
    pub async fn load(&self) -> Result<LoadReport, EtlError> {
        self.load_from(&self.config.staging_dir).await
    }

    /// Loads an explicit staging location into the configured database.
    pub async fn load_from(&self, staging_dir: &Path) -> Result<LoadReport, EtlError> {
        Ok(load_staging(
            staging_dir,
            &self.config.database_path,
            &self.config.table_name,
        )
        .await?)
    }

    /// Transform then load, each stage retried per `retry`.
    ///
    /// With a `ledger_path`, a key that completed less than 24 hours before
    /// `now` is skipped unless `force` is set. Once both stages succeed the key
    /// is recorded with its completion time, `now` plus the time the stages
    /// took. Without a ledger every call runs.
    ///
    /// `retry` defaults to [`RetryPolicy::default`], `now` to the current time.
    #[builder]
    pub async fn run(
        &self,
        key: IdempotencyKey,
        ledger_path: Option<PathBuf>,
        retry: Option<RetryPolicy>,
        now: Option<DateTime<Utc>>,
        #[builder(default)] force: bool,
    ) -> Result<RunOutcome, EtlError> {
        let retry = retry.unwrap_or_default();
        let now = now.unwrap_or_else(Utc::now);

        let mut ledger = match &ledger_path {
            Some(path) => Some(RunLedger::load(path).await?),
            None => None,
        };

        if let Some(ledger) = &ledger {
            if force {
                info!("Ignoring run ledger for key {}", key);
            } else if ledger.is_fresh(&key, now, default_ledger_ttl()) {
                if let Some(completed_at) = ledger.completed_at(&key) {
                    info!(
                        "Key {} already completed at {}, skipping run",
                        key, completed_at
                    );
                    return Ok(RunOutcome::Skipped { key, completed_at });
                }
            }
        }

        info!("Starting run for key {}", key);
        let started = Instant::now();
        let transform = run_with_retry("transform", &retry, || self.transform()).await?;
        let load = run_with_retry("load", &retry, || self.load_from(&transform.staging_dir)).await?;

        if let Some(ledger) = ledger.as_mut() {
            let elapsed = TimeDelta::from_std(started.elapsed()).unwrap_or_default();
            ledger.record(&key, now + elapsed);
            ledger.save().await?;
        }
        info!("Run for key {} complete", key);

        Ok(RunOutcome::Completed { transform, load })
    }
}
