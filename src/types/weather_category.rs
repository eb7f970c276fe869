//! Defines the `WeatherCategory` enum, collapsing free-text weather condition
//! descriptions into four coarse buckets.

use std::fmt;

/// Coarse weather bucket derived from an hourly condition description.
///
/// The weather feed reports conditions as free text such as `"Partially cloudy"`
/// or `"Rain, Overcast"`. The pipeline only needs a handful of categories, so the
/// text is reduced with [`WeatherCategory::classify`].
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum WeatherCategory {
    /// Any description mentioning rain.
    Rain,
    /// Any description mentioning snow (and not rain).
    Snow,
    /// Any description mentioning cloud (and neither rain nor snow).
    Cloudy,
    /// Everything else, including a missing description.
    Clear,
}

impl WeatherCategory {
    /// Classifies a condition description.
    ///
    /// Matching is a case-insensitive substring test checked in priority order:
    /// `rain`, then `snow`, then `cloud`. The first hit wins; anything else is
    /// [`WeatherCategory::Clear`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use taxi_weather_etl::WeatherCategory;
    ///
    /// assert_eq!(WeatherCategory::classify("Light Rain and Clouds"), WeatherCategory::Rain);
    /// assert_eq!(WeatherCategory::classify("light snow"), WeatherCategory::Snow);
    /// assert_eq!(WeatherCategory::classify("Partially cloudy"), WeatherCategory::Cloudy);
    /// assert_eq!(WeatherCategory::classify("Sunny"), WeatherCategory::Clear);
    /// ```
    pub fn classify(conditions: &str) -> Self {
        let lowered = conditions.to_lowercase();
        if lowered.contains("rain") {
            WeatherCategory::Rain
        } else if lowered.contains("snow") {
            WeatherCategory::Snow
        } else if lowered.contains("cloud") {
            WeatherCategory::Cloudy
        } else {
            WeatherCategory::Clear
        }
    }

    /// Same as [`WeatherCategory::classify`] but treats a missing description as clear.
    pub fn classify_opt(conditions: Option<&str>) -> Self {
        conditions.map_or(WeatherCategory::Clear, Self::classify)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCategory::Rain => "Rain",
            WeatherCategory::Snow => "Snow",
            WeatherCategory::Cloudy => "Cloudy",
            WeatherCategory::Clear => "Clear",
        }
    }
}

impl fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
