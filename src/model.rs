//! Source-grain ride records and the closed categorical domains they carry.

use crate::categorize::Hour;
use crate::measure::Measure;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::fmt;

/// Separator used when building a route key from its endpoints.
pub const ROUTE_SEPARATOR: &str = " → ";

/// One completed trip. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RideRecord {
    pub ride_id: String,
    pub datetime: NaiveDateTime,
    pub date: NaiveDate,
    pub hour: Hour,
    pub vehicle_type: VehicleType,
    pub from_location: String,
    pub to_location: String,
    pub distance_km: f64,
    pub base_price: f64,
    pub final_price: f64,
    pub surge_multiplier: f64,
    pub waiting_time_minutes: f64,
    pub price_premium_percent: Measure,
    pub weather_condition: WeatherCondition,
    pub weather_main: Option<String>,
    pub weather_description: String,
    pub temperature: f64,
    pub humidity: f64,
    pub precipitation: f64,
    pub wind_speed: f64,
    pub visibility: f64,
    pub is_weekend: bool,
    pub distance_category: Option<String>,
}

impl RideRecord {
    /// Natural key of the trip's route, `"origin → destination"`.
    pub fn route_id(&self) -> String {
        route_key(&self.from_location, &self.to_location)
    }

    pub fn surge_amount(&self) -> f64 {
        self.final_price - self.base_price
    }
}

pub fn route_key(from: &str, to: &str) -> String {
    format!("{from}{ROUTE_SEPARATOR}{to}")
}

/// Fixed attributes of a known vehicle category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleProfile {
    pub capacity: u8,
    pub base_fare_per_km: f64,
    pub surge_sensitivity: &'static str,
    pub weather_impact: &'static str,
    pub category: &'static str,
}

/// Vehicle category of a ride. Unrecognized names are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VehicleType {
    Bike,
    Auto,
    Cab,
    Other(String),
}

impl VehicleType {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "bike" => Self::Bike,
            "auto" => Self::Auto,
            "cab" => Self::Cab,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Bike => "bike",
            Self::Auto => "auto",
            Self::Cab => "cab",
            Self::Other(name) => name,
        }
    }

    /// Lookup attributes; `None` for categories outside the fixed table.
    pub fn profile(&self) -> Option<VehicleProfile> {
        match self {
            Self::Bike => Some(VehicleProfile {
                capacity: 1,
                base_fare_per_km: 12.0,
                surge_sensitivity: "High",
                weather_impact: "High",
                category: "Two Wheeler",
            }),
            Self::Auto => Some(VehicleProfile {
                capacity: 3,
                base_fare_per_km: 18.0,
                surge_sensitivity: "Medium",
                weather_impact: "Medium",
                category: "Three Wheeler",
            }),
            Self::Cab => Some(VehicleProfile {
                capacity: 4,
                base_fare_per_km: 25.0,
                surge_sensitivity: "Low",
                weather_impact: "Low",
                category: "Four Wheeler",
            }),
            Self::Other(_) => None,
        }
    }
}

/// Weather condition of a ride. Unrecognized names are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WeatherCondition {
    Clear,
    Clouds,
    Haze,
    Rain,
    Thunderstorm,
    Other(String),
}

impl WeatherCondition {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "clear" => Self::Clear,
            "clouds" => Self::Clouds,
            "haze" => Self::Haze,
            "rain" => Self::Rain,
            "thunderstorm" => Self::Thunderstorm,
            _ => Self::Other(trimmed.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Clear => "Clear",
            Self::Clouds => "Clouds",
            Self::Haze => "Haze",
            Self::Rain => "Rain",
            Self::Thunderstorm => "Thunderstorm",
            Self::Other(name) => name,
        }
    }

    pub fn impact_category(&self) -> &'static str {
        match self {
            Self::Rain | Self::Thunderstorm => "High Impact",
            Self::Clouds | Self::Haze => "Medium Impact",
            Self::Clear => "Low Impact",
            Self::Other(_) => "Unknown",
        }
    }

    /// Ordinal severity 1 (Clear) to 5 (Thunderstorm); 0 when unknown.
    pub fn severity_score(&self) -> u8 {
        match self {
            Self::Clear => 1,
            Self::Clouds => 2,
            Self::Haze => 3,
            Self::Rain => 4,
            Self::Thunderstorm => 5,
            Self::Other(_) => 0,
        }
    }

    pub fn expected_surge_multiplier(&self) -> f64 {
        match self {
            Self::Clear => 1.1,
            Self::Clouds => 1.3,
            Self::Haze => 1.4,
            Self::Rain => 1.8,
            Self::Thunderstorm => 2.2,
            Self::Other(_) => 1.0,
        }
    }

    pub fn is_extreme(&self) -> bool {
        matches!(self, Self::Rain | Self::Thunderstorm)
    }
}

macro_rules! serialize_as_str {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.as_str())
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

serialize_as_str!(VehicleType, WeatherCondition);
