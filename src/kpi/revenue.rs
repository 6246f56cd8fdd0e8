use super::{Breakdown, Measure, mean_of, sum_by, total_revenue};
use crate::schema::FactRow;
use crate::stats::mean;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueKpis {
    pub total_revenue: f64,
    pub avg_revenue_per_ride: Measure,
    pub revenue_by_vehicle: Breakdown,
    /// Absolute revenue above base fares.
    pub surge_revenue_impact: f64,
    /// Surge revenue as a percentage of total revenue.
    pub surge_contribution_percent: Measure,
    pub avg_price_premium_percent: Measure,
    pub revenue_per_km: Measure,
    /// Mean final/base price ratio over rides with a non-zero base fare.
    pub avg_cost_efficiency_ratio: Measure,
}

pub fn compute(fact: &[FactRow]) -> RevenueKpis {
    let total = total_revenue(fact);
    let surge: f64 = fact.iter().map(|r| r.final_price - r.base_price).sum();
    let distance: f64 = fact.iter().map(|r| r.distance_km).sum();

    let premiums: Vec<f64> = fact
        .iter()
        .filter_map(|r| r.price_premium_percent.value())
        .collect();

    RevenueKpis {
        total_revenue: total,
        avg_revenue_per_ride: mean_of(fact, |r| r.final_price),
        revenue_by_vehicle: sum_by(fact, |r| r.vehicle_type.to_string(), |r| r.final_price),
        surge_revenue_impact: surge,
        surge_contribution_percent: Measure::ratio(surge, total).map(|s| s * 100.0),
        avg_price_premium_percent: mean(&premiums),
        revenue_per_km: Measure::ratio(total, distance),
        avg_cost_efficiency_ratio: cost_efficiency(fact),
    }
}

pub(crate) fn cost_efficiency(fact: &[FactRow]) -> Measure {
    let ratios: Vec<f64> = fact
        .iter()
        .filter(|r| r.base_price != 0.0)
        .map(|r| r.final_price / r.base_price)
        .collect();
    mean(&ratios)
}
