use super::revenue::cost_efficiency;
use super::temporal::month_key;
use super::{Measure, count_by, mean_by, sum_by, total_revenue};
use crate::config::PipelineConfig;
use crate::schema::FactRow;
use crate::stats::{group_by, mean, quantile, sample_std};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BusinessKpis {
    /// Distribution of trip counts across routes.
    pub customer_demand_score: Describe,
    /// Share of revenue earned by rides above the surge threshold.
    pub surge_pricing_effectiveness: Measure,
    /// Trips per origin.
    pub market_penetration_by_area: BTreeMap<String, usize>,
    /// Inverse mean wait per origin; undefined where the mean wait is zero.
    pub service_quality_index: BTreeMap<String, Measure>,
    /// Mean final/base price ratio.
    pub competitive_pricing_analysis: Measure,
    /// Percent change from the first to the last observed month.
    pub revenue_growth_rate: Measure,
}

/// Summary statistics in the layout of a dataframe `describe()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Describe {
    pub count: usize,
    pub mean: Measure,
    pub std: Measure,
    pub min: Measure,
    #[serde(rename = "25%")]
    pub p25: Measure,
    #[serde(rename = "50%")]
    pub p50: Measure,
    #[serde(rename = "75%")]
    pub p75: Measure,
    pub max: Measure,
}

impl Describe {
    pub fn of(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Describe {
            count: values.len(),
            mean: mean(values),
            std: sample_std(values),
            min: quantile(&sorted, 0.0),
            p25: quantile(&sorted, 0.25),
            p50: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: quantile(&sorted, 1.0),
        }
    }
}

pub fn compute(fact: &[FactRow], config: &PipelineConfig) -> BusinessKpis {
    let trips_per_route: Vec<f64> = group_by(fact, |r| r.location_route_id.clone())
        .into_iter()
        .map(|(_, rows)| rows.len() as f64)
        .collect();

    let surged: f64 = fact
        .iter()
        .filter(|r| r.surge_multiplier > config.surge_threshold)
        .map(|r| r.final_price)
        .sum();

    let service_quality_index =
        mean_by(fact, |r| r.from_location.clone(), |r| r.waiting_time_minutes)
            .into_iter()
            .map(|(origin, wait)| (origin, Measure::ratio(1.0, wait)))
            .collect();

    BusinessKpis {
        customer_demand_score: Describe::of(&trips_per_route),
        surge_pricing_effectiveness: Measure::ratio(surged, total_revenue(fact)),
        market_penetration_by_area: count_by(fact, |r| r.from_location.clone()),
        service_quality_index,
        competitive_pricing_analysis: cost_efficiency(fact),
        revenue_growth_rate: growth_rate(&sum_by(fact, month_key, |r| r.final_price)),
    }
}

/// Growth between the earliest and latest month. Zero with a single month.
fn growth_rate(monthly: &BTreeMap<String, f64>) -> Measure {
    match (monthly.first_key_value(), monthly.last_key_value()) {
        (Some((first_month, first)), Some((last_month, last))) if first_month != last_month => {
            Measure::ratio(last - first, *first).map(|g| g * 100.0)
        }
        _ => Measure::Value(0.0),
    }
}
