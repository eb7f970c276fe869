use crate::transform::weather_normalizer::NormalizedWeather;
use crate::types::columns::*;
use polars::prelude::*;

/// Attaches weather to geo-enriched trips.
///
/// Two left joins: the exact reading on (`pickup_date`, `pickup_hour`), then the
/// day-of-week/hour pattern on (`pickup_dayofweek`, `pickup_hour`). Temperature
/// is taken from the first of exact reading, pattern mean and global mean that is
/// present, so it is never null. Trips without an exact reading get
/// `weather_date`/`weather_hour` copied from their pickup. Join keys and pattern
/// columns are dropped from the result.
pub fn join_weather(geo_trips: LazyFrame, weather: &NormalizedWeather) -> LazyFrame {
    let exact = weather.observations.clone().lazy().with_columns([
        col(WEATHER_DATE).alias(WEATHER_KEY_DATE),
        col(WEATHER_HOUR).alias(WEATHER_KEY_HOUR),
    ]);

    geo_trips
        .join(
            exact,
            [col(PICKUP_DATE), col(PICKUP_HOUR)],
            [col(WEATHER_KEY_DATE), col(WEATHER_KEY_HOUR)],
            JoinArgs::new(JoinType::Left),
        )
        .join(
            weather.patterns.clone().lazy(),
            [col(PICKUP_DAYOFWEEK), col(PICKUP_HOUR)],
            [col(PATTERN_DOW), col(PATTERN_HOUR)],
            JoinArgs::new(JoinType::Left),
        )
        .with_columns([
            col(TEMPERATURE)
                .fill_null(col(AVG_TEMP_DOW_HOUR))
                .fill_null(lit(weather.global_avg_temperature)),
            col(WEATHER_DATE).fill_null(col(PICKUP_DATE)),
            col(WEATHER_HOUR).fill_null(col(PICKUP_HOUR)),
        ])
        .select([all().exclude(INTERMEDIATE_COLUMNS)])
}
