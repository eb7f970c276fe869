pub mod columns;
pub mod reports;
pub mod weather_category;
pub mod weather_record;
