//! The load stage: staged parquet in, one SQLite table out.

pub mod error;
pub mod loader;
pub mod sql_value;

pub use loader::{inspect_table, load_staging, replace_table};
