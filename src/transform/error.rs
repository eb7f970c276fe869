use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("Source {what} not found at '{path}'")]
    SourceMissing { what: &'static str, path: PathBuf },

    #[error("Failed to scan trip parquet files at '{0}'")]
    TripScan(PathBuf, #[source] PolarsError),

    #[error("Failed to read zone lookup CSV '{0}'")]
    ZoneRead(PathBuf, #[source] PolarsError),

    #[error("Failed to read weather document '{0}'")]
    WeatherRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse weather document '{0}'")]
    WeatherParse(PathBuf, #[source] serde_json::Error),

    #[error("Required column '{column}' not found in {frame} data")]
    MissingColumn { frame: &'static str, column: String },

    #[error("Failed to remove staging directory '{0}'")]
    StagingRemove(PathBuf, #[source] std::io::Error),

    #[error("Failed to create staging directory '{0}'")]
    StagingCreate(PathBuf, #[source] std::io::Error),

    // Errors during parquet writing (inside blocking task)
    #[error("I/O error writing staging file '{0}'")]
    ParquetWriteIo(PathBuf, #[source] std::io::Error),
    #[error("Encoding error writing staging file '{0}'")]
    ParquetWritePolars(PathBuf, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
