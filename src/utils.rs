use crate::schedule::error::ScheduleError;
use log::info;
use std::io;
use std::path::{Path, PathBuf};

const CACHE_DIR_NAME: &str = "taxi_weather_etl";

pub fn get_cache_dir() -> Result<PathBuf, ScheduleError> {
    dirs::cache_dir()
        .ok_or(ScheduleError::CacheDirResolution)
        .map(|p| p.join(CACHE_DIR_NAME))
}

pub async fn ensure_dir_exists(path: &Path) -> Result<(), ScheduleError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => {
            if !metadata.is_dir() {
                return Err(ScheduleError::NotADirectory(path.to_path_buf()));
            }
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!("Creating directory: {}", path.display());
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| ScheduleError::LedgerDirCreation(path.to_path_buf(), e))
        }
        Err(e) => Err(ScheduleError::LedgerDirCreation(path.to_path_buf(), e)),
    }
}
