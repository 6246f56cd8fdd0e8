use super::slice;
use crate::config::PipelineConfig;
use crate::kpi::{Breakdown, Measure, Ranked, count_by, mean_by, mean_of, ranked_groups, top_n};
use crate::schema::FactRow;
use serde::Serialize;
use std::collections::BTreeMap;

/// Morning (08:00–09:59) and evening (17:00–18:59) rush windows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RushHourAnalysis {
    pub morning_rush: RushWindow,
    pub evening_rush: RushWindow,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RushWindow {
    pub total_trips: usize,
    pub total_revenue: f64,
    pub avg_surge_multiplier: Measure,
    pub avg_waiting_time: Measure,
    /// Routes ranked by trip count.
    pub most_popular_routes: Vec<Ranked>,
    pub vehicle_preference: BTreeMap<String, usize>,
    pub avg_distance: Measure,
    /// Mean surge multiplier per weather condition.
    pub weather_impact: Breakdown,
}

impl RushWindow {
    fn of(rows: &[FactRow], route_limit: usize) -> Self {
        let routes = ranked_groups(rows, |r| r.location_route_id.clone(), |trips| {
            Some(trips.len() as f64)
        });

        RushWindow {
            total_trips: rows.len(),
            total_revenue: rows.iter().map(|r| r.final_price).sum(),
            avg_surge_multiplier: mean_of(rows, |r| r.surge_multiplier),
            avg_waiting_time: mean_of(rows, |r| r.waiting_time_minutes),
            most_popular_routes: top_n(routes, route_limit),
            vehicle_preference: count_by(rows, |r| r.vehicle_type.to_string()),
            avg_distance: mean_of(rows, |r| r.distance_km),
            weather_impact: mean_by(
                rows,
                |r| r.weather_condition.to_string(),
                |r| r.surge_multiplier,
            ),
        }
    }
}

pub fn analyze(fact: &[FactRow], config: &PipelineConfig) -> RushHourAnalysis {
    let morning = slice(fact, |r| r.hour.is_morning_rush());
    let evening = slice(fact, |r| r.hour.is_evening_rush());

    RushHourAnalysis {
        morning_rush: RushWindow::of(&morning, config.rush_route_limit),
        evening_rush: RushWindow::of(&evening, config.rush_route_limit),
    }
}
