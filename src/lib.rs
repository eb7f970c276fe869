mod config;
mod error;
pub mod load;
mod pipeline;
pub mod schedule;
pub mod transform;
mod types;
mod utils;

pub use config::{
    PipelineConfig, DEFAULT_FALLBACK_TEMPERATURE, DEFAULT_ROWS_PER_FILE, DEFAULT_TABLE_NAME,
};
pub use error::EtlError;
pub use pipeline::*;

pub use load::error::LoadError;
pub use schedule::error::ScheduleError;
pub use transform::error::TransformError;

pub use schedule::{IdempotencyKey, RetryPolicy, RunLedger};

pub use types::columns;
pub use types::reports::{LoadReport, TransformReport};
pub use types::weather_category::WeatherCategory;
pub use types::weather_record::{HourlyObservation, WeatherDay, WeatherDocument, WeatherHour};
