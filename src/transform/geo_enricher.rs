use crate::transform::error::TransformError;
use crate::types::columns::*;
use polars::prelude::*;
use std::path::Path;

/// Lazily reads the header-bearing zone lookup CSV.
pub fn read_zones(path: &Path) -> Result<LazyFrame, TransformError> {
    LazyCsvReader::new(path)
        .with_has_header(true)
        .finish()
        .map_err(|e| TransformError::ZoneRead(path.to_path_buf(), e))
}

/// Renames the zone key to the trip key and the borough to `PU_Borough`.
/// Other lookup columns are kept as they are.
pub fn prepare_zones(zones: LazyFrame) -> LazyFrame {
    zones.select([
        all().exclude([ZONE_LOCATION_ID, ZONE_BOROUGH]),
        col(ZONE_LOCATION_ID)
            .cast(DataType::Int64)
            .alias(PU_LOCATION_ID),
        col(ZONE_BOROUGH).alias(PU_BOROUGH),
    ])
}

/// Day of week with Sunday = 1 through Saturday = 7.
///
/// Polars numbers weekdays ISO style (Monday = 1 .. Sunday = 7).
pub(crate) fn sunday_first_weekday(expr: Expr) -> Expr {
    (expr.dt().weekday().cast(DataType::Int32) % lit(7)) + lit(1)
}

/// Left-joins zones onto cleaned trips and derives the pickup calendar features.
///
/// Trips whose location id has no zone keep a null `PU_Borough`; no row is
/// dropped. Adds `pickup_date`, `pickup_hour`, `pickup_dayofweek` and
/// `is_weekend`.
pub fn enrich_geo(trips: LazyFrame, zones: LazyFrame) -> LazyFrame {
    trips
        .with_column(col(PU_LOCATION_ID).cast(DataType::Int64))
        .join(
            prepare_zones(zones),
            [col(PU_LOCATION_ID)],
            [col(PU_LOCATION_ID)],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([
            col(PICKUP_DATETIME).dt().date().alias(PICKUP_DATE),
            col(PICKUP_DATETIME)
                .dt()
                .hour()
                .cast(DataType::Int32)
                .alias(PICKUP_HOUR),
            sunday_first_weekday(col(PICKUP_DATETIME)).alias(PICKUP_DAYOFWEEK),
        ])
        .with_column(
            col(PICKUP_DAYOFWEEK)
                .eq(lit(1))
                .or(col(PICKUP_DAYOFWEEK).eq(lit(7)))
                .alias(IS_WEEKEND),
        )
}
