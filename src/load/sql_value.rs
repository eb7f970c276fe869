//! Mapping between polars values and SQLite storage classes.

use crate::transform::weather_normalizer::UNIX_EPOCH_DAYS_FROM_CE;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use rusqlite::types::{Value, ValueRef};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// SQLite column affinity for a polars dtype.
pub fn affinity(dtype: &DataType) -> &'static str {
    match dtype {
        DataType::Boolean => "INTEGER",
        dt if dt.is_integer() => "INTEGER",
        dt if dt.is_float() => "REAL",
        _ => "TEXT",
    }
}

/// Wraps an identifier in double quotes, doubling any embedded quote.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Converts one polars cell into the value bound to the insert statement.
pub fn to_sql_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Integer(b as i64),
        AnyValue::Int8(v) => Value::Integer(v as i64),
        AnyValue::Int16(v) => Value::Integer(v as i64),
        AnyValue::Int32(v) => Value::Integer(v as i64),
        AnyValue::Int64(v) => Value::Integer(v),
        AnyValue::UInt8(v) => Value::Integer(v as i64),
        AnyValue::UInt16(v) => Value::Integer(v as i64),
        AnyValue::UInt32(v) => Value::Integer(v as i64),
        // SQLite integers are signed 64 bit
        AnyValue::UInt64(v) => match i64::try_from(v) {
            Ok(v) => Value::Integer(v),
            Err(_) => Value::Text(v.to_string()),
        },
        AnyValue::Float32(v) => Value::Real(v as f64),
        AnyValue::Float64(v) => Value::Real(v),
        AnyValue::Date(days) => match date_from_epoch_days(days) {
            Some(date) => Value::Text(date.format(DATE_FORMAT).to_string()),
            None => Value::Null,
        },
        AnyValue::Datetime(ts, unit, _) => match datetime_from_timestamp(ts, unit) {
            Some(dt) => Value::Text(dt.format(DATETIME_FORMAT).to_string()),
            None => Value::Null,
        },
        other => match other.get_str() {
            Some(s) => Value::Text(s.to_string()),
            None => Value::Text(other.to_string()),
        },
    }
}

/// Renders a stored value for the load report.
pub fn render(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(n) => n.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(_) => "<blob>".to_string(),
    }
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)?)
}

fn datetime_from_timestamp(ts: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let utc = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(ts)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(ts),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(ts),
    };
    utc.map(|dt| dt.naive_utc())
}
