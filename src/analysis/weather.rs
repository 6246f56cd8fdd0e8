//! Weather impact, with rain treated as the primary condition of interest.

use super::slice;
use crate::categorize::{Hour, month_name};
use crate::kpi::{Measure, count_by, mean_of};
use crate::measure::round2;
use crate::model::WeatherCondition;
use crate::schema::FactRow;
use crate::stats::{group_by, mean};
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherAnalysis {
    pub overall_impact: BTreeMap<String, ConditionStats>,
    pub rain_focus: RainFocus,
    /// Trips per condition per month name. Unobserved pairs are zero.
    pub seasonal_patterns: BTreeMap<String, BTreeMap<String, usize>>,
    /// Mean surge per condition per hour. Unobserved pairs are zero.
    pub hourly_weather_impact: BTreeMap<String, BTreeMap<Hour, f64>>,
    pub extreme_weather: ExtremeWeather,
}

/// Per-condition aggregates, rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionStats {
    pub trips: usize,
    pub avg_price: f64,
    pub total_revenue: f64,
    pub avg_surge_multiplier: f64,
    pub max_surge_multiplier: f64,
    pub avg_waiting_time: f64,
    pub avg_distance: f64,
    pub avg_price_premium_percent: Measure,
}

impl ConditionStats {
    fn of(rows: &[&FactRow]) -> Self {
        let n = rows.len() as f64;
        let sum = |value: fn(&FactRow) -> f64| rows.iter().map(|r| value(r)).sum::<f64>();
        let premiums: Vec<f64> = rows
            .iter()
            .filter_map(|r| r.price_premium_percent.value())
            .collect();

        ConditionStats {
            trips: rows.len(),
            avg_price: round2(sum(|r| r.final_price) / n),
            total_revenue: round2(sum(|r| r.final_price)),
            avg_surge_multiplier: round2(sum(|r| r.surge_multiplier) / n),
            max_surge_multiplier: rows
                .iter()
                .map(|r| r.surge_multiplier)
                .fold(f64::NEG_INFINITY, f64::max),
            avg_waiting_time: round2(sum(|r| r.waiting_time_minutes) / n),
            avg_distance: round2(sum(|r| r.distance_km) / n),
            avg_price_premium_percent: mean(&premiums).round2(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainFocus {
    pub rain_premium: RainPremium,
    pub rain_vs_clear_comparison: RainVsClear,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainPremium {
    pub avg_surge_multiplier: Measure,
    pub max_surge_seen: Measure,
    /// Revenue above base fares earned in the rain.
    pub revenue_boost: f64,
    pub trip_volume: usize,
    pub avg_waiting_time: Measure,
    /// Most common vehicle in the rain; alphabetical on ties.
    pub popular_vehicle_in_rain: Option<String>,
}

/// Rain minus clear. The mean differences are zero when no clear rides exist.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RainVsClear {
    pub surge_difference: Measure,
    pub price_difference: Measure,
    pub demand_difference: i64,
    pub waiting_time_difference: Measure,
}

/// Rides in rain or thunderstorms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtremeWeather {
    pub extreme_weather_revenue: f64,
    pub extreme_weather_trips: usize,
    pub avg_extreme_surge: Measure,
    pub extreme_weather_share: Measure,
}

pub fn analyze(fact: &[FactRow]) -> WeatherAnalysis {
    let overall_impact = group_by(fact, |r| r.weather_condition.to_string())
        .into_iter()
        .map(|(condition, rows)| (condition, ConditionStats::of(&rows)))
        .collect();

    let rain = slice(fact, |r| r.weather_condition == WeatherCondition::Rain);
    let clear = slice(fact, |r| r.weather_condition == WeatherCondition::Clear);
    let extreme = slice(fact, |r| r.weather_condition.is_extreme());

    WeatherAnalysis {
        overall_impact,
        rain_focus: RainFocus {
            rain_premium: rain_premium(&rain),
            rain_vs_clear_comparison: compare(&rain, &clear),
        },
        seasonal_patterns: seasonal_patterns(fact),
        hourly_weather_impact: hourly_weather_impact(fact),
        extreme_weather: ExtremeWeather {
            extreme_weather_revenue: extreme.iter().map(|r| r.final_price).sum(),
            extreme_weather_trips: extreme.len(),
            avg_extreme_surge: mean_of(&extreme, |r| r.surge_multiplier),
            extreme_weather_share: Measure::ratio(extreme.len() as f64, fact.len() as f64)
                .map(|s| s * 100.0),
        },
    }
}

fn rain_premium(rain: &[FactRow]) -> RainPremium {
    let popular_vehicle_in_rain = count_by(rain, |r| r.vehicle_type.to_string())
        .into_iter()
        .fold(None, |best: Option<(String, usize)>, (vehicle, n)| match best {
            Some((_, top)) if top >= n => best,
            _ => Some((vehicle, n)),
        })
        .map(|(vehicle, _)| vehicle);

    RainPremium {
        avg_surge_multiplier: mean_of(rain, |r| r.surge_multiplier),
        max_surge_seen: rain
            .iter()
            .map(|r| r.surge_multiplier)
            .reduce(f64::max)
            .into(),
        revenue_boost: rain.iter().map(|r| r.final_price - r.base_price).sum(),
        trip_volume: rain.len(),
        avg_waiting_time: mean_of(rain, |r| r.waiting_time_minutes),
        popular_vehicle_in_rain,
    }
}

fn compare(rain: &[FactRow], clear: &[FactRow]) -> RainVsClear {
    let difference = |value: fn(&FactRow) -> f64| {
        if clear.is_empty() {
            Measure::Value(0.0)
        } else {
            mean_of(rain, value).zip_with(mean_of(clear, value), |r, c| r - c)
        }
    };

    RainVsClear {
        surge_difference: difference(|r| r.surge_multiplier),
        price_difference: difference(|r| r.final_price),
        demand_difference: rain.len() as i64 - clear.len() as i64,
        waiting_time_difference: difference(|r| r.waiting_time_minutes),
    }
}

fn seasonal_patterns(fact: &[FactRow]) -> BTreeMap<String, BTreeMap<String, usize>> {
    let months: Vec<&str> = fact.iter().map(|r| month_name(r.date.month())).collect();
    let mut patterns: BTreeMap<String, BTreeMap<String, usize>> = BTreeMap::new();

    for row in fact {
        patterns
            .entry(row.weather_condition.to_string())
            .or_insert_with(|| months.iter().map(|m| (m.to_string(), 0)).collect());
    }
    for (row, month) in fact.iter().zip(&months) {
        if let Some(count) = patterns
            .get_mut(row.weather_condition.as_str())
            .and_then(|by_month| by_month.get_mut(*month))
        {
            *count += 1;
        }
    }
    patterns
}

fn hourly_weather_impact(fact: &[FactRow]) -> BTreeMap<String, BTreeMap<Hour, f64>> {
    let hours: Vec<Hour> = count_by(fact, |r| r.hour).into_keys().collect();

    group_by(fact, |r| r.weather_condition.to_string())
        .into_iter()
        .map(|(condition, rows)| {
            let by_hour = hours
                .iter()
                .map(|&hour| {
                    let surges: Vec<f64> = rows
                        .iter()
                        .filter(|r| r.hour == hour)
                        .map(|r| r.surge_multiplier)
                        .collect();
                    (hour, mean(&surges).or_zero())
                })
                .collect();
            (condition, by_hour)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpi::test_support::*;
    use chrono::NaiveDate;

    fn weather_mix() -> Vec<FactRow> {
        vec![
            with_weather(fact("R1", 8, 100.0, 100.0, 5.0), "Clear", 1.0),
            with_weather(fact("R2", 9, 100.0, 120.0, 5.0), "Clear", 1.2),
            with_weather(with_vehicle(fact("R3", 8, 100.0, 180.0, 5.0), "cab"), "Rain", 1.8),
            with_weather(with_vehicle(fact("R4", 9, 100.0, 200.0, 5.0), "auto"), "Rain", 2.0),
            with_weather(fact("R5", 18, 100.0, 250.0, 5.0), "Thunderstorm", 2.5),
        ]
    }

    #[test]
    fn test_rain_premium() {
        let analysis = analyze(&weather_mix());
        let premium = &analysis.rain_focus.rain_premium;

        assert_eq!(premium.trip_volume, 2);
        assert_eq!(premium.revenue_boost, 180.0);
        assert_eq!(premium.max_surge_seen, Measure::Value(2.0));
        assert_eq!(premium.popular_vehicle_in_rain.as_deref(), Some("auto"));
    }

    #[test]
    fn test_rain_vs_clear_comparison() {
        let comparison = analyze(&weather_mix()).rain_focus.rain_vs_clear_comparison;
        assert!(approx(comparison.surge_difference, 0.8));
        assert!(approx(comparison.price_difference, 80.0));
        assert_eq!(comparison.demand_difference, 0);
        assert_eq!(comparison.waiting_time_difference, Measure::Value(0.0));
    }

    #[test]
    fn test_rain_vs_clear_without_clear_rides_is_zero() {
        let fact: Vec<FactRow> = weather_mix().into_iter().skip(2).collect();
        let comparison = analyze(&fact).rain_focus.rain_vs_clear_comparison;
        assert_eq!(comparison.surge_difference, Measure::Value(0.0));
        assert_eq!(comparison.demand_difference, 2);
    }

    #[test]
    fn test_extreme_weather_share() {
        let extreme = analyze(&weather_mix()).extreme_weather;
        assert_eq!(extreme.extreme_weather_trips, 3);
        assert_eq!(extreme.extreme_weather_revenue, 630.0);
        assert!(approx(extreme.extreme_weather_share, 60.0));
    }

    #[test]
    fn test_overall_impact_per_condition() {
        let overall = analyze(&weather_mix()).overall_impact;
        assert_eq!(overall.len(), 3);
        assert_eq!(overall["Rain"].trips, 2);
        assert_eq!(overall["Rain"].avg_price, 190.0);
        assert_eq!(overall["Clear"].avg_surge_multiplier, 1.1);
        assert_eq!(overall["Thunderstorm"].max_surge_multiplier, 2.5);
    }

    #[test]
    fn test_seasonal_and_hourly_matrices_are_filled() {
        let mut fact = weather_mix();
        fact[0].date = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let analysis = analyze(&fact);

        assert_eq!(analysis.seasonal_patterns["Clear"]["April"], 1);
        assert_eq!(analysis.seasonal_patterns["Clear"]["March"], 1);
        assert_eq!(analysis.seasonal_patterns["Rain"]["April"], 0);

        let eighteen = Hour::new(18).unwrap();
        assert_eq!(analysis.hourly_weather_impact["Thunderstorm"][&eighteen], 2.5);
        assert_eq!(analysis.hourly_weather_impact["Rain"][&eighteen], 0.0);
        assert_eq!(analysis.hourly_weather_impact["Rain"].len(), 3);
    }
}
