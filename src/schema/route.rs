//! Route and location dimensions.

use crate::bands::{distance_band, popularity_band};
use crate::measure::{Measure, round2};
use crate::model::RideRecord;
use crate::stats::{group_by, mean};
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

/// One row per distinct `location_route_id`, the key fact rows join on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteRow {
    pub location_route_id: String,
    pub route_id: usize,
    pub from_location: String,
    pub to_location: String,
    pub avg_distance: f64,
    pub min_distance: f64,
    pub max_distance: f64,
    pub avg_price: f64,
    pub total_trips: usize,
    pub distance_category: Option<&'static str>,
    pub popularity_category: Option<&'static str>,
}

/// Groups rides by route key. Endpoint pairs that render to the same key
/// share one row and the first-encountered pair names it.
pub fn build_route_dimension(rides: &[RideRecord]) -> Vec<RouteRow> {
    group_by(rides, RideRecord::route_id)
        .into_iter()
        .enumerate()
        .map(|(i, (key, trips))| {
            let first = trips[0];
            for ride in &trips[1..] {
                if ride.from_location != first.from_location
                    || ride.to_location != first.to_location
                {
                    warn!(
                        route = %key,
                        kept_from = %first.from_location,
                        discarded_from = %ride.from_location,
                        "Route key collision resolved to first endpoints"
                    );
                }
            }

            let distances: Vec<f64> = trips.iter().map(|r| r.distance_km).collect();
            let prices: Vec<f64> = trips.iter().map(|r| r.final_price).collect();
            let avg_distance = round2(mean(&distances).or_zero());

            RouteRow {
                location_route_id: key,
                route_id: i + 1,
                from_location: first.from_location.clone(),
                to_location: first.to_location.clone(),
                avg_distance,
                min_distance: distances.iter().copied().fold(f64::INFINITY, f64::min),
                max_distance: distances.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                avg_price: round2(mean(&prices).or_zero()),
                total_trips: trips.len(),
                distance_category: distance_band(avg_distance),
                popularity_category: popularity_band(trips.len()),
            }
        })
        .collect()
}

/// One row per distinct place appearing as an origin or a destination.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationRow {
    pub location_name: String,
    pub location_id: usize,
    pub location_category: &'static str,
}

pub fn build_location_dimension(rides: &[RideRecord]) -> Vec<LocationRow> {
    let mut seen = HashSet::new();
    rides
        .iter()
        .map(|r| r.from_location.as_str())
        .chain(rides.iter().map(|r| r.to_location.as_str()))
        .filter(|name| seen.insert(*name))
        .enumerate()
        .map(|(i, name)| LocationRow {
            location_name: name.to_string(),
            location_id: i + 1,
            location_category: location_category(name),
        })
        .collect()
}

/// Keyword classification of a place name. The first matching rule wins.
pub fn location_category(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    let mentions = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if name.contains("VIT") {
        "University"
    } else if mentions(&["hospital", "medical"]) {
        "Healthcare"
    } else if mentions(&["station", "railway"]) {
        "Transportation Hub"
    } else if mentions(&["road", "street"]) {
        "Residential/Commercial"
    } else if mentions(&["bus", "stand"]) {
        "Bus Terminal"
    } else {
        "General"
    }
}

/// Revenue per km of a set of rides; undefined when they cover no distance.
pub fn revenue_per_km(rides: impl IntoIterator<Item = (f64, f64)>) -> Measure {
    let (revenue, distance) = rides
        .into_iter()
        .fold((0.0, 0.0), |(rev, dist), (price, km)| (rev + price, dist + km));
    Measure::ratio(revenue, distance)
}
