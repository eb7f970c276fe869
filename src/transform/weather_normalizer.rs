//! Flattens the nested weather document and derives the two fallback aggregates
//! used by temperature imputation.

use crate::transform::error::TransformError;
use crate::types::columns::*;
use crate::types::weather_record::{HourlyObservation, WeatherDocument};
use chrono::Datelike;
use log::{debug, info};
use polars::prelude::*;
use std::path::Path;
use tokio::fs;

/// `NaiveDate::num_days_from_ce` of 1970-01-01, the epoch of polars' `Date` type.
pub(crate) const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Normalized weather plus its fallback aggregates, all materialized.
#[derive(Debug, Clone)]
pub struct NormalizedWeather {
    /// One row per reading: `weather_date`, `weather_hour`, `temperature`,
    /// `conditions`, `weather_category`, `weather_dayofweek`.
    pub observations: DataFrame,
    /// Mean temperature per (`pattern_dow`, `pattern_hour`) as `avg_temp_dow_hour`.
    pub patterns: DataFrame,
    /// Mean of every reading, or the configured fallback when there is none.
    pub global_avg_temperature: f64,
}

impl NormalizedWeather {
    /// Builds observations and aggregates from a parsed document.
    ///
    /// `fallback_temperature` becomes the global average when the document has no
    /// readings or none of them carries a temperature.
    pub fn from_document(
        document: &WeatherDocument,
        fallback_temperature: f64,
    ) -> Result<Self, TransformError> {
        let rows = document.flatten();
        let observations = observations_frame(&rows)?;
        let global_avg_temperature = global_avg_temperature(&observations, fallback_temperature)?;
        let patterns = weather_patterns(observations.clone().lazy()).collect()?;

        info!(
            "Normalized {} weather observations into {} day-of-week/hour patterns, global mean {:.2}",
            observations.height(),
            patterns.height(),
            global_avg_temperature
        );

        Ok(Self {
            observations,
            patterns,
            global_avg_temperature,
        })
    }
}

/// Reads and parses the weather JSON document.
pub async fn read_weather_document(path: &Path) -> Result<WeatherDocument, TransformError> {
    let bytes = fs::read(path)
        .await
        .map_err(|e| TransformError::WeatherRead(path.to_path_buf(), e))?;
    debug!("Read {} bytes of weather JSON from {:?}", bytes.len(), path);
    serde_json::from_slice(&bytes).map_err(|e| TransformError::WeatherParse(path.to_path_buf(), e))
}

/// Turns flattened readings into a typed frame.
pub fn observations_frame(rows: &[HourlyObservation]) -> PolarsResult<DataFrame> {
    let dates: Vec<Option<i32>> = rows
        .iter()
        .map(|r| r.date.map(|d| d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE))
        .collect();
    let hours: Vec<Option<i32>> = rows.iter().map(|r| r.hour.map(|h| h as i32)).collect();
    let temperatures: Vec<Option<f64>> = rows.iter().map(|r| r.temperature).collect();
    let conditions: Vec<Option<String>> = rows.iter().map(|r| r.conditions.clone()).collect();
    let categories: Vec<&str> = rows.iter().map(|r| r.category.as_str()).collect();
    let days_of_week: Vec<Option<i32>> = rows
        .iter()
        .map(|r| r.day_of_week().map(|d| d as i32))
        .collect();

    df!(
        WEATHER_DATE => dates,
        WEATHER_HOUR => hours,
        TEMPERATURE => temperatures,
        CONDITIONS => conditions,
        WEATHER_CATEGORY => categories,
        WEATHER_DAYOFWEEK => days_of_week,
    )?
    .lazy()
    .with_column(col(WEATHER_DATE).cast(DataType::Date))
    .collect()
}

/// Mean temperature over every observation, `fallback` when undefined.
pub fn global_avg_temperature(observations: &DataFrame, fallback: f64) -> PolarsResult<f64> {
    let mean = observations
        .clone()
        .lazy()
        .select([col(TEMPERATURE).mean()])
        .collect()?;
    Ok(mean
        .column(TEMPERATURE)?
        .f64()?
        .get(0)
        .filter(|t| !t.is_nan())
        .unwrap_or(fallback))
}

/// Mean temperature per (day of week, hour), keyed as `pattern_dow`/`pattern_hour`.
pub fn weather_patterns(observations: LazyFrame) -> LazyFrame {
    observations
        .group_by([col(WEATHER_DAYOFWEEK), col(WEATHER_HOUR)])
        .agg([col(TEMPERATURE).mean().alias(AVG_TEMP_DOW_HOUR)])
        .select([
            col(WEATHER_DAYOFWEEK).alias(PATTERN_DOW),
            col(WEATHER_HOUR).alias(PATTERN_HOUR),
            col(AVG_TEMP_DOW_HOUR),
        ])
}
