use super::{Breakdown, Measure, count_by, mean_by};
use crate::model::WeatherCondition;
use crate::schema::FactRow;
use crate::stats::{EqualWidthBins, mean, pearson};
use serde::Serialize;
use std::collections::BTreeMap;

const IMPACT_BINS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherKpis {
    /// Mean surge multiplier per weather condition.
    pub weather_surge_frequency: Breakdown,
    /// Mean rain surge over mean clear surge; zero when either is unobserved.
    pub rain_vs_clear_multiplier: Measure,
    /// Trips per weather condition.
    pub weather_demand_correlation: BTreeMap<String, usize>,
    pub precipitation_impact: Vec<BinSummary>,
    pub temperature_price_correlation: Measure,
    pub visibility_impact: Vec<BinSummary>,
    /// Mean surge during thunderstorms; zero when none were observed.
    pub storm_revenue_boost: f64,
}

/// One non-empty equal-width bin of a weather measure.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinSummary {
    pub range: String,
    pub trips: usize,
    pub avg_surge_multiplier: f64,
}

pub fn compute(fact: &[FactRow]) -> WeatherKpis {
    let surge_of = |condition: WeatherCondition| -> Vec<f64> {
        fact.iter()
            .filter(|r| r.weather_condition == condition)
            .map(|r| r.surge_multiplier)
            .collect()
    };
    let rain = mean(&surge_of(WeatherCondition::Rain));
    let clear = mean(&surge_of(WeatherCondition::Clear));
    let rain_vs_clear_multiplier = match (rain, clear) {
        (Measure::Value(rain), Measure::Value(clear)) => Measure::ratio(rain, clear),
        _ => Measure::Value(0.0),
    };

    let temperatures: Vec<f64> = fact.iter().map(|r| r.temperature).collect();
    let prices: Vec<f64> = fact.iter().map(|r| r.final_price).collect();

    WeatherKpis {
        weather_surge_frequency: mean_by(
            fact,
            |r| r.weather_condition.to_string(),
            |r| r.surge_multiplier,
        ),
        rain_vs_clear_multiplier,
        weather_demand_correlation: count_by(fact, |r| r.weather_condition.to_string()),
        precipitation_impact: binned(fact, |r| r.precipitation),
        temperature_price_correlation: pearson(&temperatures, &prices),
        visibility_impact: binned(fact, |r| r.visibility),
        storm_revenue_boost: mean(&surge_of(WeatherCondition::Thunderstorm)).or_zero(),
    }
}

/// Splits rides into equal-width bins of `value` and summarizes the non-empty
/// ones in ascending bin order.
pub fn binned(fact: &[FactRow], value: impl Fn(&FactRow) -> f64) -> Vec<BinSummary> {
    let values: Vec<f64> = fact.iter().map(&value).collect();
    let Some(bins) = EqualWidthBins::new(&values, IMPACT_BINS) else {
        return Vec::new();
    };

    let mut totals = vec![(0usize, 0.0f64); bins.len()];
    for (row, v) in fact.iter().zip(&values) {
        if let Some(i) = bins.index_of(*v) {
            totals[i].0 += 1;
            totals[i].1 += row.surge_multiplier;
        }
    }

    totals
        .into_iter()
        .enumerate()
        .filter(|(_, (trips, _))| *trips > 0)
        .map(|(i, (trips, surge))| BinSummary {
            range: bins.label(i),
            trips,
            avg_surge_multiplier: surge / trips as f64,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::test_support::*;

    fn weather_mix() -> Vec<FactRow> {
        vec![
            with_weather(fact("R1", 8, 100.0, 100.0, 5.0), "Clear", 1.0),
            with_weather(fact("R2", 9, 100.0, 120.0, 5.0), "Clear", 1.2),
            with_weather(fact("R3", 10, 100.0, 180.0, 5.0), "Rain", 1.8),
            with_weather(fact("R4", 11, 100.0, 200.0, 5.0), "Rain", 2.0),
        ]
    }

    #[test]
    fn test_rain_vs_clear_multiplier() {
        let kpis = compute(&weather_mix());
        assert!(approx(kpis.rain_vs_clear_multiplier, 1.9 / 1.1));
        assert_eq!(kpis.weather_demand_correlation["Rain"], 2);
        assert!((kpis.weather_surge_frequency["Clear"] - 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_rain_vs_clear_zero_without_rain() {
        let kpis = compute(&three_rides());
        assert_eq!(kpis.rain_vs_clear_multiplier, Measure::Value(0.0));
        assert_eq!(kpis.storm_revenue_boost, 0.0);
    }

    #[test]
    fn test_storm_revenue_boost() {
        let mut fact = weather_mix();
        fact.push(with_weather(fact[0].clone(), "Thunderstorm", 2.4));
        assert_eq!(compute(&fact).storm_revenue_boost, 2.4);
    }

    #[test]
    fn test_precipitation_bins_report_only_observed_ranges() {
        let mut fact = weather_mix();
        for (row, mm) in fact.iter_mut().zip([0.0, 0.0, 4.0, 10.0]) {
            row.precipitation = mm;
        }
        let bins = compute(&fact).precipitation_impact;

        assert_eq!(bins.len(), 3);
        assert_eq!(bins[0].trips, 2);
        assert!((bins[0].avg_surge_multiplier - 1.1).abs() < 1e-9);
        assert_eq!(bins[2].range, "(8.00, 10.00]");
        assert_eq!(bins.iter().map(|b| b.trips).sum::<usize>(), 4);
    }

    #[test]
    fn test_temperature_correlation() {
        let mut fact = weather_mix();
        for (row, t) in fact.iter_mut().zip([20.0, 24.0, 28.0, 32.0]) {
            row.temperature = t;
        }
        let r = compute(&fact).temperature_price_correlation.value().unwrap();
        assert!(r > 0.9);
    }

    #[test]
    fn test_empty_bins() {
        assert!(binned(&[], |r| r.visibility).is_empty());
    }
}
