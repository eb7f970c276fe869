use crate::schedule::error::ScheduleError;
use crate::utils::{ensure_dir_exists, get_cache_dir};
use chrono::{DateTime, Local, NaiveDate, TimeDelta, Utc};
use log::debug;
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LEDGER_FILE_NAME: &str = "run_ledger.json";
const MAX_KEY_LEN: usize = 128;

/// Hours a completed key suppresses new runs.
pub const DEFAULT_LEDGER_TTL_HOURS: i64 = 24;

pub fn default_ledger_ttl() -> TimeDelta {
    TimeDelta::hours(DEFAULT_LEDGER_TTL_HOURS)
}

/// Identifies one logical pipeline run, usually the processing date.
///
/// # Examples
///
/// ```
/// use taxi_weather_etl::IdempotencyKey;
/// use chrono::NaiveDate;
///
/// let key = IdempotencyKey::for_date(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
/// assert_eq!(key.as_str(), "2023-01-01");
///
/// let custom: IdempotencyKey = "backfill_2023-q1".parse().unwrap();
/// assert_eq!(custom.to_string(), "backfill_2023-q1");
/// assert!("no spaces".parse::<IdempotencyKey>().is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn for_date(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    /// Key for today's local date.
    pub fn today() -> Self {
        Self::for_date(Local::now().date_naive())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for IdempotencyKey {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = !s.is_empty()
            && s.len() <= MAX_KEY_LEN
            && s
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
        if valid {
            Ok(Self(s.to_string()))
        } else {
            Err(ScheduleError::InvalidKey(s.to_string()))
        }
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Default ledger location inside the user cache directory.
pub fn default_ledger_path() -> Result<PathBuf, ScheduleError> {
    Ok(get_cache_dir()?.join(LEDGER_FILE_NAME))
}

/// Completion times of past runs, persisted as a JSON object `key -> timestamp`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunLedger {
    path: PathBuf,
    entries: BTreeMap<String, DateTime<Utc>>,
}

impl RunLedger {
    /// Reads the ledger at `path`; a missing file is an empty ledger.
    pub async fn load(path: &Path) -> Result<Self, ScheduleError> {
        let entries = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| ScheduleError::LedgerDecode(path.to_path_buf(), e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No run ledger at {:?}, starting empty", path);
                BTreeMap::new()
            }
            Err(e) => return Err(ScheduleError::LedgerRead(path.to_path_buf(), e)),
        };
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn completed_at(&self, key: &IdempotencyKey) -> Option<DateTime<Utc>> {
        self.entries.get(key.as_str()).copied()
    }

    /// True when `key` completed less than `ttl` before `now`.
    pub fn is_fresh(&self, key: &IdempotencyKey, now: DateTime<Utc>, ttl: TimeDelta) -> bool {
        self.completed_at(key)
            .is_some_and(|done| now.signed_duration_since(done) < ttl)
    }

    pub fn record(&mut self, key: &IdempotencyKey, completed_at: DateTime<Utc>) {
        self.entries.insert(key.as_str().to_string(), completed_at);
    }

    pub async fn save(&self) -> Result<(), ScheduleError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir_exists(parent).await?;
        }
        let bytes =
            serde_json::to_vec_pretty(&self.entries).map_err(ScheduleError::LedgerEncode)?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| ScheduleError::LedgerWrite(self.path.clone(), e))
    }
}
