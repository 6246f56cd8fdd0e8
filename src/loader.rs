//! CSV reader for the flat ride table.
//!
//! The header is checked against [`REQUIRED_COLUMNS`] before any row is
//! deserialized, so a schema mismatch reports every missing column at once
//! instead of failing deep inside an aggregation.

use crate::categorize::{self, Hour};
use crate::error::{PipelineError, Result};
use crate::measure::Measure;
use crate::model::{RideRecord, VehicleType, WeatherCondition};
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

pub const REQUIRED_COLUMNS: [&str; 18] = [
    "ride_id",
    "datetime",
    "hour",
    "vehicle_type",
    "from_location",
    "to_location",
    "distance_km",
    "base_price",
    "final_price",
    "surge_multiplier",
    "waiting_time_minutes",
    "weather_condition",
    "weather_description",
    "temperature",
    "humidity",
    "precipitation",
    "wind_speed",
    "visibility",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// A single row as it appears in the source file.
#[derive(Debug, Deserialize)]
struct RawRide {
    ride_id: String,
    datetime: String,
    #[serde(default)]
    date: Option<String>,
    hour: i64,
    vehicle_type: String,
    from_location: String,
    to_location: String,
    distance_km: f64,
    base_price: f64,
    final_price: f64,
    surge_multiplier: f64,
    waiting_time_minutes: f64,
    #[serde(default)]
    price_premium_percent: Option<f64>,
    weather_condition: String,
    #[serde(default)]
    weather_main: Option<String>,
    weather_description: String,
    temperature: f64,
    humidity: f64,
    precipitation: f64,
    wind_speed: f64,
    visibility: f64,
    #[serde(default)]
    is_weekend: Option<String>,
    #[serde(default)]
    distance_category: Option<String>,
}

/// Opens `path` and loads every ride.
#[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
pub fn load_rides(path: impl AsRef<Path>) -> Result<Vec<RideRecord>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PipelineError::InputMissing {
        path: path.to_path_buf(),
        source,
    })?;
    let rides = read_rides(file)?;
    info!(rides = rides.len(), "Ride table loaded");
    Ok(rides)
}

/// Reads rides from any CSV source.
pub fn read_rides<R: Read>(reader: R) -> Result<Vec<RideRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    verify_required_columns(&headers)?;

    let mut rides = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let raw: RawRide = record
            .deserialize(Some(&headers))
            .map_err(|source| PipelineError::MalformedRecord { line, source })?;
        rides.push(into_ride(raw, line)?);
    }

    debug!(rows = rides.len(), "Parsed ride rows");
    Ok(rides)
}

/// Checks a header row for every required column, naming all that are absent.
pub fn verify_required_columns(headers: &StringRecord) -> Result<()> {
    let present: HashSet<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !present.contains(**column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::MissingColumns(missing))
    }
}

/// Validates only the header of the file at `path`.
pub fn validate_schema(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| PipelineError::InputMissing {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);
    verify_required_columns(rdr.headers()?)
}

fn into_ride(raw: RawRide, line: u64) -> Result<RideRecord> {
    let datetime = parse_datetime(&raw.datetime).ok_or_else(|| PipelineError::InvalidField {
        line,
        field: "datetime",
        value: raw.datetime.clone(),
    })?;

    let date = match raw.date.as_deref().filter(|d| !d.is_empty()) {
        Some(text) => parse_date(text).ok_or_else(|| PipelineError::InvalidField {
            line,
            field: "date",
            value: text.to_string(),
        })?,
        None => datetime.date(),
    };

    let hour = Hour::new(raw.hour).map_err(|source| PipelineError::InvalidHour {
        ride_id: raw.ride_id.clone(),
        source,
    })?;

    let is_weekend = match raw.is_weekend.as_deref().filter(|w| !w.is_empty()) {
        Some(text) => parse_flag(text).ok_or_else(|| PipelineError::InvalidField {
            line,
            field: "is_weekend",
            value: text.to_string(),
        })?,
        None => categorize::is_weekend(date),
    };

    let price_premium_percent = match raw.price_premium_percent {
        Some(p) => Measure::new(p),
        None => Measure::ratio(raw.final_price, raw.base_price).map(|r| (r - 1.0) * 100.0),
    };

    Ok(RideRecord {
        ride_id: raw.ride_id,
        datetime,
        date,
        hour,
        vehicle_type: VehicleType::parse(&raw.vehicle_type),
        from_location: raw.from_location,
        to_location: raw.to_location,
        distance_km: raw.distance_km,
        base_price: raw.base_price,
        final_price: raw.final_price,
        surge_multiplier: raw.surge_multiplier,
        waiting_time_minutes: raw.waiting_time_minutes,
        price_premium_percent,
        weather_condition: WeatherCondition::parse(&raw.weather_condition),
        weather_main: raw.weather_main.filter(|m| !m.is_empty()),
        weather_description: raw.weather_description,
        temperature: raw.temperature,
        humidity: raw.humidity,
        precipitation: raw.precipitation,
        wind_speed: raw.wind_speed,
        visibility: raw.visibility,
        is_weekend,
        distance_category: raw.distance_category.filter(|c| !c.is_empty()),
    })
}

fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(text).map(|dt| dt.date()))
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = concat!(
        "ride_id,datetime,hour,vehicle_type,from_location,to_location,distance_km,",
        "base_price,final_price,surge_multiplier,waiting_time_minutes,weather_condition,",
        "weather_description,temperature,humidity,precipitation,wind_speed,visibility",
    );

    fn csv_with(rows: &[&str]) -> String {
        let mut out = HEADER.to_string();
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out
    }

    #[test]
    fn test_reads_minimal_row() {
        let data = csv_with(&[
            concat!(
                "R1,2024-03-09 08:15:00,8,bike,VIT Main Gate,Katpadi Station,",
                "10,100,120,1.2,4,Rain,light rain,27.5,80,2.1,3.4,6000",
            ),
        ]);
        let rides = read_rides(data.as_bytes()).unwrap();
        assert_eq!(rides.len(), 1);

        let ride = &rides[0];
        assert_eq!(ride.hour.get(), 8);
        assert_eq!(ride.vehicle_type, VehicleType::Bike);
        assert_eq!(ride.weather_condition, WeatherCondition::Rain);
        assert_eq!(ride.date, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert!(ride.is_weekend, "2024-03-09 is a Saturday");
        assert_eq!(ride.price_premium_percent, Measure::Value(20.0));
    }

    #[test]
    fn test_reports_every_missing_column() {
        let data = "ride_id,datetime,hour\nR1,2024-03-09 08:15:00,8";
        match read_rides(data.as_bytes()) {
            Err(PipelineError::MissingColumns(missing)) => {
                assert_eq!(missing.len(), REQUIRED_COLUMNS.len() - 3);
                assert!(missing.contains(&"final_price".to_string()));
                assert!(!missing.contains(&"hour".to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_out_of_range_hour() {
        let data = csv_with(&[
            "R9,2024-03-09 08:15:00,24,cab,A,B,1,10,10,1,1,Clear,clear sky,30,40,0,1,10000",
        ]);
        let err = read_rides(data.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidHour { ref ride_id, .. } if ride_id == "R9"));
    }

    #[test]
    fn test_rejects_bad_datetime() {
        let data =
            csv_with(&["R1,yesterday,8,cab,A,B,1,10,10,1,1,Clear,clear sky,30,40,0,1,10000"]);
        let err = read_rides(data.as_bytes()).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidField { field: "datetime", .. }));
    }

    #[test]
    fn test_optional_columns_override_derivation() {
        let data = format!(
            "{HEADER},is_weekend,price_premium_percent,weather_main\n\
             R1,2024-03-11T09:00:00,9,auto,A,B,3,50,60,1.2,2,Clouds,few clouds,\
             25,60,0,2,9000,True,15.5,Clouds"
        );
        let rides = read_rides(data.as_bytes()).unwrap();
        assert!(rides[0].is_weekend);
        assert_eq!(rides[0].price_premium_percent, Measure::Value(15.5));
        assert_eq!(rides[0].weather_main.as_deref(), Some("Clouds"));
    }

    #[test]
    fn test_zero_base_price_premium_is_undefined() {
        let data = csv_with(&[
            "R1,2024-03-11 09:00:00,9,auto,A,B,3,0,60,1.2,2,Clear,clear,25,60,0,2,9000",
        ]);
        let rides = read_rides(data.as_bytes()).unwrap();
        assert_eq!(rides[0].price_premium_percent, Measure::Undefined);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_rides("/nonexistent/rides.csv").unwrap_err();
        assert!(matches!(err, PipelineError::InputMissing { .. }));
    }
}
