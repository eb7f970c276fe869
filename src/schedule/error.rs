use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Failed to determine cache directory")]
    CacheDirResolution,

    #[error("Failed to create ledger directory '{0}'")]
    LedgerDirCreation(PathBuf, #[source] std::io::Error),

    #[error("Ledger path '{0}' exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to read run ledger '{0}'")]
    LedgerRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to write run ledger '{0}'")]
    LedgerWrite(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode run ledger '{0}'")]
    LedgerDecode(PathBuf, #[source] serde_json::Error),

    #[error("Failed to encode run ledger")]
    LedgerEncode(#[source] serde_json::Error),

    #[error("Invalid idempotency key '{0}'")]
    InvalidKey(String),
}
