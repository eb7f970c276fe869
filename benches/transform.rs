use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use polars::prelude::*;
use taxi_weather_etl::transform::enrich_trips;
use taxi_weather_etl::transform::weather_normalizer::NormalizedWeather;
use taxi_weather_etl::{WeatherCategory, WeatherDocument};

const TRIPS: i64 = 50_000;

fn trips() -> DataFrame {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start");
    let pickups: Vec<_> = (0..TRIPS)
        .map(|i| start + chrono::Duration::minutes(i))
        .collect();
    let dropoffs: Vec<_> = pickups
        .iter()
        .map(|p| *p + chrono::Duration::minutes(12))
        .collect();
    df!(
        "tpep_pickup_datetime" => pickups,
        "tpep_dropoff_datetime" => dropoffs,
        "trip_distance" => (0..TRIPS).map(|i| (i % 20) as f64 * 0.5).collect::<Vec<_>>(),
        "fare_amount" => (0..TRIPS).map(|i| 3.0 + (i % 40) as f64).collect::<Vec<_>>(),
        "PULocationID" => (0..TRIPS).map(|i| i % 265 + 1).collect::<Vec<_>>(),
    )
    .expect("trip frame")
}

fn zones() -> DataFrame {
    let ids: Vec<i64> = (1..=265).collect();
    let boroughs: Vec<&str> = ids
        .iter()
        .map(|i| ["Manhattan", "Queens", "Brooklyn", "Bronx"][(*i % 4) as usize])
        .collect();
    df!("LocationID" => ids, "Borough" => boroughs).expect("zone frame")
}

fn weather() -> NormalizedWeather {
    let days: Vec<String> = (1..=31)
        .map(|d| {
            let hours: Vec<String> = (0..24)
                .map(|h| {
                    format!(
                        r#"{{"datetime": "{h:02}:00:00", "temp": {}.5, "conditions": "Partially cloudy"}}"#,
                        h % 12
                    )
                })
                .collect();
            format!(
                r#"{{"datetime": "2023-01-{d:02}", "hours": [{}]}}"#,
                hours.join(",")
            )
        })
        .collect();
    let json = format!(r#"{{"days": [{}]}}"#, days.join(","));
    let document: WeatherDocument = serde_json::from_str(&json).expect("weather json");
    NormalizedWeather::from_document(&document, 10.0).expect("weather frames")
}

fn bench_transform(c: &mut Criterion) {
    c.bench_function("classify", |b| {
        b.iter(|| WeatherCategory::classify(black_box("Snow, Rain, Overcast")))
    });

    let trips = trips();
    let zones = zones();
    let weather = weather();
    c.bench_function("enrich_trips", |b| {
        b.iter(|| {
            enrich_trips(
                black_box(trips.clone().lazy()),
                zones.clone().lazy(),
                &weather,
            )
            .expect("enrich")
        })
    });
}

criterion_group!(benches, bench_transform);
criterion_main!(benches);
