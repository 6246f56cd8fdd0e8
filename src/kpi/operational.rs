use super::{Breakdown, Measure, count_by, mean_of};
use crate::categorize::Hour;
use crate::schema::FactRow;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationalKpis {
    pub total_trip_volume: usize,
    pub avg_trip_distance: Measure,
    /// Share of trips served by each vehicle category.
    pub fleet_utilization_by_vehicle: Breakdown,
    pub avg_waiting_time: Measure,
    /// Every loaded ride is a completed trip.
    pub trip_completion_rate: Measure,
    /// Trips per hour, restricted to the rush hours.
    pub peak_hour_trip_distribution: BTreeMap<Hour, usize>,
    /// Share of categorized trips per distance band.
    pub distance_category_distribution: Breakdown,
}

pub fn compute(fact: &[FactRow]) -> OperationalKpis {
    let categorized: Vec<&str> = fact
        .iter()
        .filter_map(|r| r.distance_category.as_deref())
        .collect();

    let mut distance_category_distribution = Breakdown::new();
    for category in &categorized {
        *distance_category_distribution
            .entry(category.to_string())
            .or_insert(0.0) += 1.0;
    }
    for share in distance_category_distribution.values_mut() {
        *share /= categorized.len() as f64;
    }

    OperationalKpis {
        total_trip_volume: fact.len(),
        avg_trip_distance: mean_of(fact, |r| r.distance_km),
        fleet_utilization_by_vehicle: proportions(count_by(fact, |r| r.vehicle_type.to_string())),
        avg_waiting_time: mean_of(fact, |r| r.waiting_time_minutes),
        trip_completion_rate: Measure::ratio(fact.len() as f64, fact.len() as f64),
        peak_hour_trip_distribution: count_by(fact, |r| r.hour)
            .into_iter()
            .filter(|(hour, _)| hour.is_rush_hour())
            .collect(),
        distance_category_distribution,
    }
}

fn proportions(counts: BTreeMap<String, usize>) -> Breakdown {
    let total: usize = counts.values().sum();
    counts
        .into_iter()
        .map(|(k, n)| (k, n as f64 / total as f64))
        .collect()
}
