use crate::types::weather_category::WeatherCategory;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Deserialize;

/// Top level of the nested weather document: `{ "days": [...] }`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WeatherDocument {
    #[serde(default)]
    pub days: Vec<WeatherDay>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherDay {
    pub datetime: Option<String>,
    #[serde(default)]
    pub hours: Vec<WeatherHour>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherHour {
    pub datetime: Option<String>,
    pub temp: Option<f64>,
    pub conditions: Option<String>,
}

/// One flattened (date, hour) weather reading.
#[derive(Debug, PartialEq, Clone)]
pub struct HourlyObservation {
    pub date: Option<NaiveDate>,
    pub hour: Option<u32>,
    pub temperature: Option<f64>,
    pub conditions: Option<String>,
    pub category: WeatherCategory,
}

impl HourlyObservation {
    /// Day of week with Sunday = 1 through Saturday = 7.
    pub fn day_of_week(&self) -> Option<u32> {
        self.date.map(|d| d.weekday().number_from_sunday())
    }
}

impl WeatherDocument {
    /// Explodes days and their hours into one observation per hour.
    pub fn flatten(&self) -> Vec<HourlyObservation> {
        self.days
            .iter()
            .flat_map(|day| {
                let date = day.datetime.as_deref().and_then(parse_day);
                day.hours.iter().map(move |hour| HourlyObservation {
                    date,
                    hour: hour.datetime.as_deref().and_then(parse_hour),
                    temperature: hour.temp,
                    conditions: hour.conditions.clone(),
                    category: WeatherCategory::classify_opt(hour.conditions.as_deref()),
                })
            })
            .collect()
    }
}

fn parse_day(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(value).map(|dt| dt.date()))
}

fn parse_hour(value: &str) -> Option<u32> {
    let value = value.trim();
    ["%H:%M:%S", "%H:%M"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
        .map(|t| t.hour())
        .or_else(|| parse_datetime(value).map(|dt| dt.hour()))
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested_document() {
        let doc: WeatherDocument = serde_json::from_str(
            r#"{
                "days": [
                    {"datetime": "2023-01-01", "hours": [
                        {"datetime": "08:00:00", "temp": 5.5, "conditions": "light snow"},
                        {"datetime": "09:00:00", "temp": 6, "conditions": null}
                    ]},
                    {"datetime": "2023-01-02", "hours": [
                        {"datetime": "2023-01-02T23:00:00", "temp": null, "conditions": "Rain"}
                    ]}
                ]
            }"#,
        )
        .unwrap();

        let rows = doc.flatten();
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(rows[0].hour, Some(8));
        assert_eq!(rows[0].temperature, Some(5.5));
        assert_eq!(rows[0].category, WeatherCategory::Snow);
        // 2023-01-01 was a Sunday
        assert_eq!(rows[0].day_of_week(), Some(1));

        assert_eq!(rows[1].temperature, Some(6.0));
        assert_eq!(rows[1].category, WeatherCategory::Clear);

        assert_eq!(rows[2].hour, Some(23));
        assert_eq!(rows[2].temperature, None);
        assert_eq!(rows[2].category, WeatherCategory::Rain);
        assert_eq!(rows[2].day_of_week(), Some(2));
    }

    #[test]
    fn test_missing_days_is_empty() {
        let doc: WeatherDocument = serde_json::from_str("{}").unwrap();
        assert!(doc.flatten().is_empty());

        let doc: WeatherDocument =
            serde_json::from_str(r#"{"days": [{"datetime": "2023-01-01"}]}"#).unwrap();
        assert!(doc.flatten().is_empty());
    }

    #[test]
    fn test_unparseable_timestamps_become_none() {
        let doc: WeatherDocument = serde_json::from_str(
            r#"{"days": [{"datetime": "yesterday", "hours": [{"datetime": "noonish", "temp": 1.0}]}]}"#,
        )
        .unwrap();
        let rows = doc.flatten();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, None);
        assert_eq!(rows[0].hour, None);
        assert_eq!(rows[0].day_of_week(), None);
        assert_eq!(rows[0].temperature, Some(1.0));
    }
}
