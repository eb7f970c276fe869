//! The transform stage: sources in, one denormalized staging dataset out.

pub mod enrichment_joiner;
pub mod error;
pub mod geo_enricher;
pub mod staging_writer;
pub mod trip_cleaner;
pub mod weather_normalizer;

use crate::config::PipelineConfig;
use crate::transform::error::TransformError;
use crate::transform::weather_normalizer::{read_weather_document, NormalizedWeather};
use crate::types::reports::TransformReport;
use log::info;
use polars::prelude::*;
use std::path::Path;
use tokio::task;

/// Lazily scans every parquet file in the trip directory.
pub fn scan_trips(trip_dir: &Path) -> Result<LazyFrame, TransformError> {
    let pattern = PipelineConfig::parquet_glob(trip_dir);
    LazyFrame::scan_parquet(&pattern, Default::default())
        .map_err(|e| TransformError::TripScan(trip_dir.to_path_buf(), e))
}

/// Output of the in-memory part of the transform, before staging.
pub struct EnrichedTrips {
    pub frame: DataFrame,
    pub raw_trips: usize,
    pub rejected_trips: usize,
}

/// Runs cleaning, geo enrichment and the weather joins over already opened sources.
pub fn enrich_trips(
    trips: LazyFrame,
    zones: LazyFrame,
    weather: &NormalizedWeather,
) -> Result<EnrichedTrips, TransformError> {
    let raw_trips = trip_cleaner::count_rows(trips.clone())?;
    let cleaned = trip_cleaner::clean_trips(trips)?.collect()?;
    let kept_trips = cleaned.height();
    let rejected_trips = raw_trips.saturating_sub(kept_trips);
    info!(
        "Cleaned trips: kept {} of {}, rejected {}",
        kept_trips, raw_trips, rejected_trips
    );

    let geo = geo_enricher::enrich_geo(cleaned.lazy(), zones);
    let frame = enrichment_joiner::join_weather(geo, weather).collect()?;
    Ok(EnrichedTrips {
        frame,
        raw_trips,
        rejected_trips,
    })
}

/// Runs the whole transform stage and stages its output.
///
/// # Errors
///
/// Any unreadable source, polars failure or staging write failure is fatal and
/// returned as a [`TransformError`]. Bad trip rows are filtered, never reported
/// as errors.
pub async fn run_transform(config: &PipelineConfig) -> Result<TransformReport, TransformError> {
    for (what, path) in [
        ("trip directory", &config.trip_dir),
        ("zone lookup", &config.zone_csv),
        ("weather document", &config.weather_json),
    ] {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(TransformError::SourceMissing {
                what,
                path: path.clone(),
            });
        }
    }

    info!("Transform started, reading sources from {:?}", config.trip_dir);
    let document = read_weather_document(&config.weather_json).await?;

    let trip_dir = config.trip_dir.clone();
    let zone_csv = config.zone_csv.clone();
    let fallback_temperature = config.fallback_temperature;
    let (enriched, weather) = task::spawn_blocking(move || {
        let weather = NormalizedWeather::from_document(&document, fallback_temperature)?;
        let trips = scan_trips(&trip_dir)?;
        let zones = geo_enricher::read_zones(&zone_csv)?;
        let enriched = enrich_trips(trips, zones, &weather)?;
        Ok::<_, TransformError>((enriched, weather))
    })
    .await??;

    let output_rows = enriched.frame.height();
    let output_columns = enriched.frame.width();
    let staged_files =
        staging_writer::write_staging(enriched.frame, &config.staging_dir, config.rows_per_file)
            .await?;

    info!(
        "Transform complete: {} rows x {} columns staged at {:?}",
        output_rows, output_columns, config.staging_dir
    );

    Ok(TransformReport {
        staging_dir: config.staging_dir.clone(),
        raw_trips: enriched.raw_trips,
        rejected_trips: enriched.rejected_trips,
        weather_observations: weather.observations.height(),
        global_avg_temperature: weather.global_avg_temperature,
        output_rows,
        output_columns,
        staged_files,
    })
}
