//! Explicit configuration handed to every pipeline stage.

use bon::Builder;
use std::path::{Path, PathBuf};

/// Table name used by the analytical store unless overridden.
pub const DEFAULT_TABLE_NAME: &str = "taxi_weather";

/// Temperature used when the weather dataset yields no mean at all.
pub const DEFAULT_FALLBACK_TEMPERATURE: f64 = 10.0;

/// Upper bound on rows per staged parquet part.
pub const DEFAULT_ROWS_PER_FILE: usize = 1_000_000;

/// Filesystem locations and tunables for one pipeline run.
///
/// Every stage receives the configuration it needs explicitly; nothing is read
/// from process-wide state. Use [`PipelineConfig::from_data_dir`] for the
/// conventional directory layout or the builder for full control.
///
/// # Examples
///
/// ```
/// use taxi_weather_etl::PipelineConfig;
///
/// let config = PipelineConfig::builder()
///     .trip_dir("/data/raw/taxi_parquet")
///     .zone_csv("/data/raw/taxi_zone_lookup.csv")
///     .weather_json("/data/raw/weather/weather_nyc.json")
///     .staging_dir("/data/staging_parquet")
///     .database_path("/data/processed/taxi_weather.sqlite")
///     .build();
///
/// assert_eq!(config.table_name, "taxi_weather");
/// assert_eq!(config.fallback_temperature, 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Builder)]
pub struct PipelineConfig {
    /// Directory of trip parquet files.
    #[builder(into)]
    pub trip_dir: PathBuf,
    /// Header-bearing zone lookup CSV.
    #[builder(into)]
    pub zone_csv: PathBuf,
    /// Nested weather JSON document.
    #[builder(into)]
    pub weather_json: PathBuf,
    /// Output directory of the transform stage, wiped on every run.
    #[builder(into)]
    pub staging_dir: PathBuf,
    /// Single-file database, deleted and recreated on every load.
    #[builder(into)]
    pub database_path: PathBuf,
    #[builder(into, default = DEFAULT_TABLE_NAME.to_string())]
    pub table_name: String,
    #[builder(default = DEFAULT_FALLBACK_TEMPERATURE)]
    pub fallback_temperature: f64,
    #[builder(default = DEFAULT_ROWS_PER_FILE)]
    pub rows_per_file: usize,
}

impl PipelineConfig {
    /// Builds the conventional layout below `data_dir`:
    ///
    /// ```text
    /// data_dir/raw/taxi_parquet/
    /// data_dir/raw/taxi_zone_lookup.csv
    /// data_dir/raw/weather/weather_nyc.json
    /// data_dir/staging_parquet/
    /// data_dir/processed/taxi_weather.sqlite
    /// ```
    pub fn from_data_dir(data_dir: &Path) -> Self {
        let raw = data_dir.join("raw");
        PipelineConfig::builder()
            .trip_dir(raw.join("taxi_parquet"))
            .zone_csv(raw.join("taxi_zone_lookup.csv"))
            .weather_json(raw.join("weather").join("weather_nyc.json"))
            .staging_dir(data_dir.join("staging_parquet"))
            .database_path(data_dir.join("processed").join("taxi_weather.sqlite"))
            .build()
    }

    /// Glob matching every parquet part below `dir`.
    pub(crate) fn parquet_glob(dir: &Path) -> PathBuf {
        dir.join("*.parquet")
    }
}
