use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to scan staged parquet files at '{0}'")]
    StagingScan(PathBuf, #[source] PolarsError),

    #[error("Failed to delete previous database file '{0}'")]
    DatabaseRemove(PathBuf, #[source] std::io::Error),

    #[error("Failed to create database directory '{0}'")]
    DatabaseDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to open database '{0}'")]
    DatabaseOpen(PathBuf, #[source] rusqlite::Error),

    #[error("Invalid table name '{0}'")]
    InvalidTableName(String),

    #[error("Staged data has no columns")]
    EmptySchema,

    #[error("SQLite operation failed: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
