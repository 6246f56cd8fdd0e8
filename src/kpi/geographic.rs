use super::{Measure, Ranked, ranked_groups, top_n, total_revenue};
use crate::config::PipelineConfig;
use crate::schema::FactRow;
use crate::schema::route::revenue_per_km;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeographicKpis {
    /// Routes ranked by revenue.
    pub top_performing_routes: Vec<Ranked>,
    pub poi_performance: PoiPerformance,
    pub avg_distance_by_route: BTreeMap<String, f64>,
    /// Routes ranked by revenue per km. Routes covering no distance are left out.
    pub route_profitability_index: Vec<Ranked>,
    /// Destinations ranked by trip count.
    pub popular_destinations: Vec<Ranked>,
}

/// Rides touching the configured point of interest at either endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoiPerformance {
    pub point_of_interest: String,
    pub total_revenue: f64,
    pub total_trips: usize,
    pub avg_price: Measure,
    pub revenue_share_percent: Measure,
}

impl PoiPerformance {
    pub fn compute(fact: &[FactRow], point_of_interest: &str) -> Self {
        let (total_trips, revenue) = fact
            .iter()
            .filter(|r| r.touches(point_of_interest))
            .fold((0, 0.0), |(n, sum), r| (n + 1, sum + r.final_price));

        PoiPerformance {
            point_of_interest: point_of_interest.to_string(),
            total_revenue: revenue,
            total_trips,
            avg_price: Measure::ratio(revenue, total_trips as f64),
            revenue_share_percent: Measure::ratio(revenue, total_revenue(fact))
                .map(|s| s * 100.0),
        }
    }
}

pub fn compute(fact: &[FactRow], config: &PipelineConfig) -> GeographicKpis {
    let route = |r: &FactRow| r.location_route_id.clone();

    let revenue = ranked_groups(fact, route, |rows| {
        Some(rows.iter().map(|r| r.final_price).sum())
    });
    let profitability = ranked_groups(fact, route, |rows| {
        revenue_per_km(rows.iter().map(|r| (r.final_price, r.distance_km))).value()
    });
    let destinations = ranked_groups(fact, |r| r.to_location.clone(), |rows| {
        Some(rows.len() as f64)
    });

    let avg_distance_by_route = ranked_groups(fact, route, |rows| {
        Some(rows.iter().map(|r| r.distance_km).sum::<f64>() / rows.len() as f64)
    })
    .into_iter()
    .map(|Ranked { key, value }| (key, value))
    .collect();

    GeographicKpis {
        top_performing_routes: top_n(revenue, config.top_n_routes),
        poi_performance: PoiPerformance::compute(fact, &config.point_of_interest),
        avg_distance_by_route,
        route_profitability_index: top_n(profitability, config.top_n_routes),
        popular_destinations: top_n(destinations, config.top_n_destinations),
    }
}
