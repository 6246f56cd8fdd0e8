//! Star-schema decomposition of the ride table.
//!
//! One fact table references six independent dimensions. Every dimension is
//! built once from the immutable ride collection and holds exactly one row
//! per distinct natural key; duplicate keys are resolved at construction
//! time by keeping the first-encountered row.

pub mod fact;
pub mod hour;
pub mod route;
pub mod time;
pub mod vehicle;
pub mod weather;

pub use fact::{FactRow, build_fact_table};
pub use hour::{HourRow, build_hour_dimension};
pub use route::{LocationRow, RouteRow, build_location_dimension, build_route_dimension};
pub use time::{TimeRow, build_time_dimension};
pub use vehicle::{VehicleRow, build_vehicle_dimension};
pub use weather::{WeatherRow, build_weather_dimension};

use crate::config::PipelineConfig;
use crate::model::RideRecord;
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct StarSchema {
    pub fact: Vec<FactRow>,
    pub time: Vec<TimeRow>,
    pub hour: Vec<HourRow>,
    pub vehicle: Vec<VehicleRow>,
    pub weather: Vec<WeatherRow>,
    pub route: Vec<RouteRow>,
    pub location: Vec<LocationRow>,
}

impl StarSchema {
    #[tracing::instrument(skip_all, fields(rides = rides.len()))]
    pub fn build(rides: &[RideRecord], config: &PipelineConfig) -> Self {
        let schema = StarSchema {
            fact: build_fact_table(rides, config.minutes_per_km),
            time: build_time_dimension(rides.iter().map(|r| r.date), config),
            hour: build_hour_dimension(),
            vehicle: build_vehicle_dimension(rides.iter().map(|r| &r.vehicle_type)),
            weather: build_weather_dimension(rides),
            route: build_route_dimension(rides),
            location: build_location_dimension(rides),
        };

        info!(
            fact = schema.fact.len(),
            time = schema.time.len(),
            vehicle = schema.vehicle.len(),
            weather = schema.weather.len(),
            route = schema.route.len(),
            location = schema.location.len(),
            "Star schema built"
        );

        let orphans = schema.orphan_keys();
        if !orphans.is_empty() {
            warn!(?orphans, "Fact keys without a dimension row");
        }

        schema
    }

    /// Fact foreign keys that have no matching dimension row, as
    /// `(dimension, key)` pairs. Empty for a well-formed schema.
    pub fn orphan_keys(&self) -> Vec<(&'static str, String)> {
        let dates: HashSet<_> = self.time.iter().map(|r| r.date).collect();
        let hours: HashSet<_> = self.hour.iter().map(|r| r.hour).collect();
        let vehicles: HashSet<_> = self.vehicle.iter().map(|r| &r.vehicle_type).collect();
        let weather: HashSet<_> = self.weather.iter().map(|r| &r.weather_condition).collect();
        let routes: HashSet<_> = self.route.iter().map(|r| r.location_route_id.as_str()).collect();

        let mut orphans = Vec::new();
        let mut seen = HashSet::new();
        for row in &self.fact {
            let checks = [
                ("time", dates.contains(&row.date), row.date.to_string()),
                ("hour", hours.contains(&row.hour), row.hour.to_string()),
                (
                    "vehicle",
                    vehicles.contains(&row.vehicle_type),
                    row.vehicle_type.to_string(),
                ),
                (
                    "weather",
                    weather.contains(&row.weather_condition),
                    row.weather_condition.to_string(),
                ),
                (
                    "route",
                    routes.contains(row.location_route_id.as_str()),
                    row.location_route_id.clone(),
                ),
            ];
            for (dimension, found, key) in checks {
                if !found && seen.insert((dimension, key.clone())) {
                    orphans.push((dimension, key));
                }
            }
        }
        orphans
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::categorize::Hour;
    use crate::measure::Measure;
    use crate::model::{RideRecord, VehicleType, WeatherCondition};
    use chrono::NaiveDate;

    /// A weekday bike ride from VIT Main Gate to Katpadi Station in clear
    /// weather with a four-minute wait.
    pub(crate) fn ride(id: &str, hour: i64, base: f64, final_price: f64, km: f64) -> RideRecord {
        let date = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let hour = Hour::new(hour).unwrap();
        RideRecord {
            ride_id: id.to_string(),
            datetime: date.and_hms_opt(hour.get() as u32, 15, 0).unwrap(),
            date,
            hour,
            vehicle_type: VehicleType::Bike,
            from_location: "VIT Main Gate".to_string(),
            to_location: "Katpadi Station".to_string(),
            distance_km: km,
            base_price: base,
            final_price,
            surge_multiplier: if base > 0.0 { final_price / base } else { 1.0 },
            waiting_time_minutes: 4.0,
            price_premium_percent: Measure::ratio(final_price, base).map(|r| (r - 1.0) * 100.0),
            weather_condition: WeatherCondition::Clear,
            weather_main: Some("Clear".to_string()),
            weather_description: "clear sky".to_string(),
            temperature: 30.0,
            humidity: 55.0,
            precipitation: 0.0,
            wind_speed: 2.0,
            visibility: 10000.0,
            is_weekend: false,
            distance_category: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::ride;
    use super::*;
    use crate::model::{VehicleType, WeatherCondition};
    use chrono::NaiveDate;
    use std::collections::HashSet;

    fn varied_rides() -> Vec<RideRecord> {
        let mut rides = vec![
            ride("R1", 8, 100.0, 120.0, 10.0),
            ride("R2", 14, 100.0, 100.0, 5.0),
            ride("R3", 18, 50.0, 90.0, 0.0),
            ride("R4", 23, 40.0, 40.0, 2.0),
        ];
        rides[1].vehicle_type = VehicleType::Cab;
        rides[1].weather_condition = WeatherCondition::Rain;
        rides[1].weather_description = "light rain".into();
        rides[2].weather_condition = WeatherCondition::Rain;
        rides[2].weather_description = "moderate rain".into();
        rides[3].date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        rides[3].to_location = "CMC Hospital".into();
        rides
    }

    #[test]
    fn test_weather_dimension_unique_per_fact_condition() {
        let schema = StarSchema::build(&varied_rides(), &PipelineConfig::default());
        let fact_conditions: HashSet<_> =
            schema.fact.iter().map(|f| f.weather_condition.clone()).collect();
        assert_eq!(schema.weather.len(), fact_conditions.len());
    }

    #[test]
    fn test_referential_completeness() {
        let schema = StarSchema::build(&varied_rides(), &PipelineConfig::default());
        assert!(schema.orphan_keys().is_empty());
        assert_eq!(schema.time.len(), 5, "11th through 15th March");
        assert_eq!(schema.hour.len(), 24);
        assert_eq!(schema.vehicle.len(), 2);
        assert_eq!(schema.route.len(), 2);
        assert_eq!(schema.location.len(), 3);
    }

    #[test]
    fn test_orphan_keys_detected() {
        let mut schema = StarSchema::build(&varied_rides(), &PipelineConfig::default());
        schema.weather.retain(|w| w.weather_condition != WeatherCondition::Rain);
        assert_eq!(schema.orphan_keys(), vec![("weather", "Rain".to_string())]);
    }

    #[test]
    fn test_build_is_deterministic() {
        let rides = varied_rides();
        let config = PipelineConfig::default();
        assert_eq!(StarSchema::build(&rides, &config), StarSchema::build(&rides, &config));
    }

    #[test]
    fn test_empty_rides() {
        let schema = StarSchema::build(&[], &PipelineConfig::default());
        assert!(schema.fact.is_empty());
        assert!(schema.time.is_empty());
        assert_eq!(schema.hour.len(), 24);
        assert!(schema.orphan_keys().is_empty());
    }
}
