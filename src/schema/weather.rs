//! Weather dimension, keyed strictly on the condition name.
//!
//! Upstream data carries several descriptions per condition ("light rain",
//! "moderate rain", ...). Those variants never produce extra rows: the first
//! encountered main/description pair is kept and the rest are counted.

use crate::model::{RideRecord, WeatherCondition};
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherRow {
    pub weather_condition: WeatherCondition,
    pub weather_id: usize,
    pub weather_main: Option<String>,
    pub weather_description: String,
    pub description_variants: usize,
    pub impact_category: &'static str,
    pub severity_score: u8,
    pub expected_surge_multiplier: f64,
}

pub fn build_weather_dimension(rides: &[RideRecord]) -> Vec<WeatherRow> {
    let mut rows: Vec<WeatherRow> = Vec::new();
    let mut variants: Vec<HashSet<&str>> = Vec::new();

    for ride in rides {
        let condition = &ride.weather_condition;
        match rows.iter().position(|r| &r.weather_condition == condition) {
            Some(i) => {
                if variants[i].insert(ride.weather_description.as_str()) {
                    warn!(
                        condition = %condition,
                        kept = %rows[i].weather_description,
                        discarded = %ride.weather_description,
                        "Weather key collision resolved to first description"
                    );
                }
            }
            None => {
                rows.push(WeatherRow {
                    weather_condition: condition.clone(),
                    weather_id: rows.len() + 1,
                    weather_main: ride.weather_main.clone(),
                    weather_description: ride.weather_description.clone(),
                    description_variants: 0,
                    impact_category: condition.impact_category(),
                    severity_score: condition.severity_score(),
                    expected_surge_multiplier: condition.expected_surge_multiplier(),
                });
                variants.push(HashSet::from([ride.weather_description.as_str()]));
            }
        }
    }

    for (row, seen) in rows.iter_mut().zip(&variants) {
        row.description_variants = seen.len();
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::test_support::ride;

    fn with_weather(id: &str, condition: &str, description: &str) -> RideRecord {
        let mut r = ride(id, 10, 50.0, 60.0, 4.0);
        r.weather_condition = WeatherCondition::parse(condition);
        r.weather_description = description.to_string();
        r
    }

    #[test]
    fn test_one_row_per_condition_despite_description_variants() {
        let rides = vec![
            with_weather("R1", "Rain", "light rain"),
            with_weather("R2", "Clear", "clear sky"),
            with_weather("R3", "Rain", "moderate rain"),
            with_weather("R4", "Rain", "heavy intensity rain"),
            with_weather("R5", "Rain", "light rain"),
        ];
        let rows = build_weather_dimension(&rides);

        assert_eq!(rows.len(), 2);
        let rain = &rows[0];
        assert_eq!(rain.weather_condition, WeatherCondition::Rain);
        assert_eq!(rain.weather_description, "light rain");
        assert_eq!(rain.description_variants, 3);
        assert_eq!(rain.severity_score, 4);
        assert_eq!(rows[1].weather_id, 2);
    }

    #[test]
    fn test_unknown_condition_uses_fallbacks() {
        let rows = build_weather_dimension(&[with_weather("R1", "Smoke", "smoke")]);
        assert_eq!(rows[0].impact_category, "Unknown");
        assert_eq!(rows[0].severity_score, 0);
        assert_eq!(rows[0].expected_surge_multiplier, 1.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(build_weather_dimension(&[]).is_empty());
    }
}
