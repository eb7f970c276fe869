use crate::transform::error::TransformError;
use crate::types::columns::*;
use log::warn;
use polars::prelude::*;

/// Longest trip kept, in minutes (one day).
pub const MAX_TRIP_MINUTES: f64 = 1440.0;

const REQUIRED_TRIP_COLUMNS: [&str; 5] = [
    RAW_PICKUP,
    RAW_DROPOFF,
    TRIP_DISTANCE,
    FARE_AMOUNT,
    PU_LOCATION_ID,
];

/// Removes unusable trips and fills defaults.
///
/// Kept rows have a positive distance and fare, both timestamps present, and a
/// `trip_duration_min` in `(0, 1440]`. Null passenger counts become 1, null tips
/// and congestion surcharges become 0.0. Source columns pass through untouched;
/// `pickup_datetime`, `dropoff_datetime` and `trip_duration_min` are added.
pub fn clean_trips(trips: LazyFrame) -> Result<LazyFrame, TransformError> {
    let mut planned = trips.clone();
    let schema = planned.collect_schema()?;

    for column in REQUIRED_TRIP_COLUMNS {
        if schema.get(column).is_none() {
            return Err(TransformError::MissingColumn {
                frame: "trip",
                column: column.to_string(),
            });
        }
    }

    let mut cleaned = trips
        .with_columns([
            timestamp(&schema, RAW_PICKUP).alias(PICKUP_DATETIME),
            timestamp(&schema, RAW_DROPOFF).alias(DROPOFF_DATETIME),
        ])
        .filter(
            col(TRIP_DISTANCE)
                .gt(lit(0))
                .and(col(FARE_AMOUNT).gt(lit(0)))
                .and(col(PICKUP_DATETIME).is_not_null())
                .and(col(DROPOFF_DATETIME).is_not_null()),
        );

    let defaults = [
        (PASSENGER_COUNT, lit(1)),
        (TIP_AMOUNT, lit(0.0)),
        (CONGESTION_SURCHARGE, lit(0.0)),
    ];
    let fills: Vec<Expr> = defaults
        .into_iter()
        .filter_map(|(column, value)| {
            if schema.get(column).is_some() {
                Some(col(column).fill_null(value))
            } else {
                warn!("Trip data has no '{}' column, skipping its default", column);
                None
            }
        })
        .collect();
    if !fills.is_empty() {
        cleaned = cleaned.with_columns(fills);
    }

    Ok(cleaned
        .with_column(trip_duration_minutes().alias(TRIP_DURATION_MIN))
        .filter(
            col(TRIP_DURATION_MIN)
                .gt(lit(0.0))
                .and(col(TRIP_DURATION_MIN).lt_eq(lit(MAX_TRIP_MINUTES))),
        ))
}

/// Microsecond timestamp of a raw trip column.
///
/// Text columns are parsed and an unparseable value fails the plan; anything
/// else is cast.
fn timestamp(schema: &Schema, column: &str) -> Expr {
    let unit = TimeUnit::Microseconds;
    match schema.get(column) {
        Some(DataType::String) => col(column).str().to_datetime(
            Some(unit),
            None,
            StrptimeOptions::default(),
            lit("raise"),
        ),
        _ => col(column).cast(DataType::Datetime(unit, None)),
    }
}

/// Whole epoch seconds of a datetime column.
fn epoch_seconds(column: &str) -> Expr {
    col(column)
        .dt()
        .timestamp(TimeUnit::Milliseconds)
        .floor_div(lit(1000i64))
}

/// `(dropoff_s - pickup_s) / 60`, rounded to two decimals.
fn trip_duration_minutes() -> Expr {
    ((epoch_seconds(DROPOFF_DATETIME) - epoch_seconds(PICKUP_DATETIME)).cast(DataType::Float64)
        / lit(60.0))
    .round(2)
}

/// Counts the rows a lazy plan produces.
pub fn count_rows(frame: LazyFrame) -> PolarsResult<usize> {
    let counted = frame
        .select([len().cast(DataType::UInt64).alias("row_count")])
        .collect()?;
    Ok(counted.column("row_count")?.u64()?.get(0).unwrap_or(0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(day: u32, hour: u32, minute: u32, second: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2023, 1, day)
            .unwrap()
            .and_hms_opt(hour, minute, second)
            .unwrap()
    }

    fn raw_trips() -> DataFrame {
        df!(
            RAW_PICKUP => [at(1, 8, 0, 0), at(1, 9, 0, 0), at(1, 10, 0, 0), at(1, 11, 0, 0), at(1, 12, 0, 0), at(1, 13, 0, 0), at(1, 14, 0, 0)],
            RAW_DROPOFF => [at(1, 8, 20, 0), at(1, 9, 10, 0), at(1, 10, 5, 0), at(1, 10, 0, 0), at(3, 12, 0, 0), at(2, 13, 0, 0), at(1, 14, 0, 50)],
            TRIP_DISTANCE => [3.2, 0.0, 1.0, 2.0, 5.0, 9.0, 0.4],
            FARE_AMOUNT => [15.0, 8.0, -3.0, 9.0, 40.0, 60.0, 3.5],
            PASSENGER_COUNT => [None, Some(2.0), Some(1.0), Some(1.0), Some(1.0), Some(3.0), Some(1.0)],
            TIP_AMOUNT => [Some(2.0), None, None, None, None, None, None],
            CONGESTION_SURCHARGE => [None, Some(2.5), None, None, None, None, None],
            PU_LOCATION_ID => [10i64, 11, 12, 13, 14, 15, 16],
        )
        .unwrap()
    }

    #[test]
    fn test_clean_trips_applies_quality_filters() -> Result<(), Box<dyn std::error::Error>> {
        let cleaned = clean_trips(raw_trips().lazy())?.collect()?;

        // Kept: the 20 minute trip, the exactly-one-day trip, the 50 second trip.
        assert_eq!(cleaned.height(), 3);

        let ids: Vec<Option<i64>> = cleaned.column(PU_LOCATION_ID)?.i64()?.into_iter().collect();
        assert_eq!(ids, vec![Some(10), Some(15), Some(16)]);

        let durations = cleaned.column(TRIP_DURATION_MIN)?.f64()?;
        assert_eq!(durations.get(0), Some(20.0));
        assert_eq!(durations.get(1), Some(1440.0));
        assert_eq!(durations.get(2), Some(0.83));

        for d in durations.into_iter().flatten() {
            assert!(d > 0.0 && d <= MAX_TRIP_MINUTES);
        }
        for v in cleaned.column(TRIP_DISTANCE)?.f64()?.into_iter().flatten() {
            assert!(v > 0.0);
        }
        for v in cleaned.column(FARE_AMOUNT)?.f64()?.into_iter().flatten() {
            assert!(v > 0.0);
        }
        Ok(())
    }

    #[test]
    fn test_clean_trips_fills_defaults() -> Result<(), Box<dyn std::error::Error>> {
        let cleaned = clean_trips(raw_trips().lazy())?.collect()?;

        let passengers = cleaned.column(PASSENGER_COUNT)?.f64()?;
        assert_eq!(passengers.get(0), Some(1.0));
        assert_eq!(passengers.get(1), Some(3.0));

        let tips = cleaned.column(TIP_AMOUNT)?.f64()?;
        assert_eq!(tips.get(0), Some(2.0));
        assert_eq!(tips.get(1), Some(0.0));

        assert_eq!(cleaned.column(CONGESTION_SURCHARGE)?.null_count(), 0);
        Ok(())
    }

    #[test]
    fn test_clean_trips_drops_null_timestamps() -> Result<(), Box<dyn std::error::Error>> {
        let raw = df!(
            RAW_PICKUP => [Some(at(1, 8, 0, 0)), None],
            RAW_DROPOFF => [None, Some(at(1, 9, 0, 0))],
            TRIP_DISTANCE => [1.0, 1.0],
            FARE_AMOUNT => [5.0, 5.0],
            PU_LOCATION_ID => [1i64, 2],
        )?;
        let cleaned = clean_trips(raw.lazy())?.collect()?;
        assert_eq!(cleaned.height(), 0);
        Ok(())
    }

    #[test]
    fn test_clean_trips_parses_string_timestamps() -> Result<(), Box<dyn std::error::Error>> {
        let raw = df!(
            RAW_PICKUP => ["2023-01-01 08:00:00", "2023-01-01 09:00:00"],
            RAW_DROPOFF => ["2023-01-01 08:20:00", "2023-01-01 09:00:30"],
            TRIP_DISTANCE => [3.2, 1.0],
            FARE_AMOUNT => [15.0, 4.0],
            PU_LOCATION_ID => [10i64, 11],
        )?;
        let cleaned = clean_trips(raw.lazy())?.collect()?;

        assert_eq!(cleaned.height(), 2);
        assert_eq!(
            cleaned.column(PICKUP_DATETIME)?.dtype(),
            &DataType::Datetime(TimeUnit::Microseconds, None)
        );
        let durations = cleaned.column(TRIP_DURATION_MIN)?.f64()?;
        assert_eq!(durations.get(0), Some(20.0));
        assert_eq!(durations.get(1), Some(0.5));
        Ok(())
    }

    #[test]
    fn test_clean_trips_rejects_unparseable_timestamps() -> Result<(), Box<dyn std::error::Error>> {
        let raw = df!(
            RAW_PICKUP => ["2023-01-01 08:00:00", "not a time"],
            RAW_DROPOFF => ["2023-01-01 08:20:00", "2023-01-01 09:00:00"],
            TRIP_DISTANCE => [3.2, 1.0],
            FARE_AMOUNT => [15.0, 4.0],
            PU_LOCATION_ID => [10i64, 11],
        )?;
        assert!(clean_trips(raw.lazy())?.collect().is_err());
        Ok(())
    }

    #[test]
    fn test_clean_trips_requires_core_columns() {
        let raw = df!(TRIP_DISTANCE => [1.0], FARE_AMOUNT => [2.0]).unwrap();
        let result = clean_trips(raw.lazy());
        assert!(matches!(
            result,
            Err(TransformError::MissingColumn { frame: "trip", .. })
        ));
    }

    #[test]
    fn test_count_rows() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(count_rows(raw_trips().lazy())?, 7);
        let cleaned = clean_trips(raw_trips().lazy())?;
        assert_eq!(count_rows(cleaned)?, 3);
        Ok(())
    }
}
