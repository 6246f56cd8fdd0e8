use super::{Breakdown, Measure, count_by, share_of, sum_by, total_revenue};
use crate::config::PipelineConfig;
use crate::model::WeatherCondition;
use crate::schema::FactRow;
use crate::stats::{coefficient_of_variation, pearson};
use serde::Serialize;

const WAIT_WEIGHT: f64 = 0.6;
const PREMIUM_WEIGHT: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategicKpis {
    /// Share of revenue per vehicle category, in percent.
    pub revenue_diversification: Breakdown,
    /// 100 minus the coefficient of variation of hourly trip counts, in percent.
    pub demand_forecasting_accuracy: Measure,
    /// Correlation between a ride's fare and the demand in its hour.
    pub price_elasticity_of_demand: Measure,
    pub customer_satisfaction_proxy: Measure,
    pub business_sustainability_index: Measure,
    pub sustainability_components: SustainabilityComponents,
}

/// Inputs to the sustainability index, each on a 0..1 scale.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SustainabilityComponents {
    pub revenue_stability: Measure,
    pub demand_consistency: Measure,
    pub weather_resilience: Measure,
}

impl SustainabilityComponents {
    /// Mean of the three components, in percent. Undefined if any is.
    pub fn index(&self) -> Measure {
        self.revenue_stability
            .zip_with(self.demand_consistency, |a, b| a + b)
            .zip_with(self.weather_resilience, |ab, c| (ab + c) / 3.0 * 100.0)
    }
}

pub fn compute(fact: &[FactRow], config: &PipelineConfig) -> StrategicKpis {
    let total = total_revenue(fact);
    let revenue_diversification = sum_by(fact, |r| r.vehicle_type.to_string(), |r| r.final_price)
        .into_iter()
        .map(|(vehicle, revenue)| {
            let share = Measure::ratio(revenue, total).or_zero() * 100.0;
            (vehicle, share)
        })
        .collect();

    let hourly = count_by(fact, |r| r.hour);
    let hourly_counts: Vec<f64> = hourly.values().map(|&n| n as f64).collect();
    let daily_revenue: Vec<f64> = sum_by(fact, |r| r.date, |r| r.final_price)
        .into_values()
        .collect();

    let prices: Vec<f64> = fact.iter().map(|r| r.final_price).collect();
    let same_hour_demand: Vec<f64> = fact
        .iter()
        .map(|r| hourly.get(&r.hour).copied().unwrap_or(0) as f64)
        .collect();

    let short_wait = share_of(fact, |r| r.waiting_time_minutes <= config.wait_threshold_minutes);
    let fair_price = share_of(fact, |r| {
        r.price_premium_percent
            .value()
            .is_some_and(|p| p <= config.premium_threshold_percent)
    });
    let customer_satisfaction_proxy = short_wait.zip_with(fair_price, |wait, price| {
        (wait * WAIT_WEIGHT + price * PREMIUM_WEIGHT) * 100.0
    });

    let demand_cv = coefficient_of_variation(&hourly_counts);
    let sustainability_components = SustainabilityComponents {
        revenue_stability: coefficient_of_variation(&daily_revenue).map(|cv| 1.0 - cv),
        demand_consistency: demand_cv.map(|cv| 1.0 - cv),
        weather_resilience: share_of(fact, |r| r.weather_condition != WeatherCondition::Clear),
    };

    StrategicKpis {
        revenue_diversification,
        demand_forecasting_accuracy: demand_cv.map(|cv| 100.0 - cv * 100.0),
        price_elasticity_of_demand: pearson(&prices, &same_hour_demand),
        customer_satisfaction_proxy,
        business_sustainability_index: sustainability_components.index(),
        sustainability_components,
    }
}
