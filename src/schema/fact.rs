//! Ride fact table: one row per ride, foreign keys plus measures.

use crate::bands::{distance_band, revenue_band, surge_band};
use crate::categorize::Hour;
use crate::measure::{Measure, round2};
use crate::model::{RideRecord, VehicleType, WeatherCondition};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactRow {
    pub ride_id: String,
    pub datetime: NaiveDateTime,

    // foreign keys
    pub date: NaiveDate,
    pub hour: Hour,
    pub vehicle_type: VehicleType,
    pub location_route_id: String,
    pub weather_condition: WeatherCondition,

    // degenerate route attributes kept for origin/destination breakdowns
    pub from_location: String,
    pub to_location: String,
    pub is_weekend: bool,

    // measures
    pub distance_km: f64,
    pub base_price: f64,
    pub final_price: f64,
    pub surge_multiplier: f64,
    pub waiting_time_minutes: f64,
    pub price_premium_percent: Measure,
    pub temperature: f64,
    pub humidity: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
    pub visibility: f64,

    // derived measures
    pub surge_amount: f64,
    pub price_per_km: Measure,
    pub revenue_per_minute: Measure,
    pub distance_category: Option<String>,
    pub revenue_category: Option<&'static str>,
    pub surge_category: Option<&'static str>,
}

impl FactRow {
    /// Derives the fact row for a single ride.
    ///
    /// `minutes_per_km` estimates in-vehicle time for revenue per minute.
    /// Zero distance or zero total time yields [`Measure::Undefined`].
    pub fn from_ride(ride: &RideRecord, minutes_per_km: f64) -> Self {
        let total_minutes = ride.waiting_time_minutes + ride.distance_km * minutes_per_km;

        FactRow {
            ride_id: ride.ride_id.clone(),
            datetime: ride.datetime,
            date: ride.date,
            hour: ride.hour,
            vehicle_type: ride.vehicle_type.clone(),
            location_route_id: ride.route_id(),
            weather_condition: ride.weather_condition.clone(),
            from_location: ride.from_location.clone(),
            to_location: ride.to_location.clone(),
            is_weekend: ride.is_weekend,
            distance_km: ride.distance_km,
            base_price: ride.base_price,
            final_price: ride.final_price,
            surge_multiplier: ride.surge_multiplier,
            waiting_time_minutes: ride.waiting_time_minutes,
            price_premium_percent: ride.price_premium_percent.round2(),
            temperature: ride.temperature,
            humidity: ride.humidity,
            precipitation: ride.precipitation,
            wind_speed: ride.wind_speed,
            visibility: ride.visibility,
            surge_amount: round2(ride.surge_amount()),
            price_per_km: Measure::ratio(ride.final_price, ride.distance_km).round2(),
            revenue_per_minute: Measure::ratio(ride.final_price, total_minutes).round2(),
            distance_category: ride
                .distance_category
                .clone()
                .or_else(|| distance_band(ride.distance_km).map(str::to_string)),
            revenue_category: revenue_band(ride.final_price),
            surge_category: surge_band(ride.surge_multiplier),
        }
    }

    /// True when either endpoint mentions `needle`.
    pub fn touches(&self, needle: &str) -> bool {
        self.from_location.contains(needle) || self.to_location.contains(needle)
    }
}

/// Builds the fact table; cardinality is preserved 1:1 with `rides`.
pub fn build_fact_table(rides: &[RideRecord], minutes_per_km: f64) -> Vec<FactRow> {
    rides
        .iter()
        .map(|ride| FactRow::from_ride(ride, minutes_per_km))
        .collect()
}
