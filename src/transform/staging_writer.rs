use crate::transform::error::TransformError;
use log::{debug, info};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::task;

/// Replaces the staging directory with `df` written as parquet parts.
///
/// The directory is deleted outright, recreated, and filled with
/// `part-00000.parquet`, `part-00001.parquet`, ... holding at most
/// `rows_per_file` rows each. An empty frame still yields one part so the schema
/// survives. Each part is encoded into a temporary file next to its final name
/// and renamed once complete.
///
/// A failure half way leaves the directory incomplete; there is no swap of a
/// fully written directory.
pub async fn write_staging(
    df: DataFrame,
    staging_dir: &Path,
    rows_per_file: usize,
) -> Result<Vec<PathBuf>, TransformError> {
    let staging_dir = staging_dir.to_path_buf();
    task::spawn_blocking(move || write_staging_blocking(df, &staging_dir, rows_per_file)).await?
}

fn write_staging_blocking(
    df: DataFrame,
    staging_dir: &Path,
    rows_per_file: usize,
) -> Result<Vec<PathBuf>, TransformError> {
    if staging_dir.exists() {
        debug!("Removing previous staging directory {:?}", staging_dir);
        std::fs::remove_dir_all(staging_dir)
            .map_err(|e| TransformError::StagingRemove(staging_dir.to_path_buf(), e))?;
    }
    std::fs::create_dir_all(staging_dir)
        .map_err(|e| TransformError::StagingCreate(staging_dir.to_path_buf(), e))?;

    let rows_per_file = rows_per_file.max(1);
    let parts = df.height().div_ceil(rows_per_file).max(1);
    let mut written = Vec::with_capacity(parts);

    for part in 0..parts {
        let offset = part * rows_per_file;
        let mut chunk = df.slice(offset as i64, rows_per_file);
        let path = staging_dir.join(format!("part-{part:05}.parquet"));
        write_part(&mut chunk, staging_dir, &path)?;
        written.push(path);
    }

    info!(
        "Staged {} rows in {} parquet file(s) at {:?}",
        df.height(),
        written.len(),
        staging_dir
    );
    Ok(written)
}

fn write_part(chunk: &mut DataFrame, staging_dir: &Path, path: &Path) -> Result<(), TransformError> {
    let mut temp_file = NamedTempFile::new_in(staging_dir)
        .map_err(|e| TransformError::ParquetWriteIo(path.to_path_buf(), e))?;
    ParquetWriter::new(temp_file.as_file_mut())
        .with_compression(ParquetCompression::Snappy)
        .finish(chunk)
        .map_err(|e| TransformError::ParquetWritePolars(path.to_path_buf(), e))?;
    temp_file
        .persist(path)
        .map_err(|e| TransformError::ParquetWriteIo(path.to_path_buf(), e.error))?;
    Ok(())
}
