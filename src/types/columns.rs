//! Column names shared across the transform stages.

// Raw trip columns
pub const RAW_PICKUP: &str = "tpep_pickup_datetime";
pub const RAW_DROPOFF: &str = "tpep_dropoff_datetime";
pub const TRIP_DISTANCE: &str = "trip_distance";
pub const FARE_AMOUNT: &str = "fare_amount";
pub const PASSENGER_COUNT: &str = "passenger_count";
pub const TIP_AMOUNT: &str = "tip_amount";
pub const CONGESTION_SURCHARGE: &str = "congestion_surcharge";
pub const PU_LOCATION_ID: &str = "PULocationID";

// Cleaned trip columns
pub const PICKUP_DATETIME: &str = "pickup_datetime";
pub const DROPOFF_DATETIME: &str = "dropoff_datetime";
pub const TRIP_DURATION_MIN: &str = "trip_duration_min";

// Zone lookup
pub const ZONE_LOCATION_ID: &str = "LocationID";
pub const ZONE_BOROUGH: &str = "Borough";
pub const PU_BOROUGH: &str = "PU_Borough";

// Temporal features
pub const PICKUP_DATE: &str = "pickup_date";
pub const PICKUP_HOUR: &str = "pickup_hour";
pub const PICKUP_DAYOFWEEK: &str = "pickup_dayofweek";
pub const IS_WEEKEND: &str = "is_weekend";

// Weather
pub const WEATHER_DATE: &str = "weather_date";
pub const WEATHER_HOUR: &str = "weather_hour";
pub const WEATHER_DAYOFWEEK: &str = "weather_dayofweek";
pub const TEMPERATURE: &str = "temperature";
pub const CONDITIONS: &str = "conditions";
pub const WEATHER_CATEGORY: &str = "weather_category";

// Pattern table
pub const PATTERN_DOW: &str = "pattern_dow";
pub const PATTERN_HOUR: &str = "pattern_hour";
pub const AVG_TEMP_DOW_HOUR: &str = "avg_temp_dow_hour";

// Right-hand keys of the exact weather join; removed from the output.
pub const WEATHER_KEY_DATE: &str = "__weather_key_date";
pub const WEATHER_KEY_HOUR: &str = "__weather_key_hour";

/// Columns that only exist to drive joins and imputation.
pub const INTERMEDIATE_COLUMNS: [&str; 7] = [
    AVG_TEMP_DOW_HOUR,
    PATTERN_DOW,
    PATTERN_HOUR,
    WEATHER_DAYOFWEEK,
    PICKUP_DAYOFWEEK,
    WEATHER_KEY_DATE,
    WEATHER_KEY_HOUR,
];
