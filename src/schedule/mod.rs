//! Thin run scheduling: retries around stages and a ledger of completed runs.

pub mod error;
pub mod ledger;
pub mod retry;

pub use ledger::{
    default_ledger_path, default_ledger_ttl, IdempotencyKey, RunLedger, DEFAULT_LEDGER_TTL_HOURS,
};
pub use retry::{run_with_retry, RetryPolicy};
