use super::{Measure, count_by, sum_by};
use crate::categorize::{Hour, day_name};
use crate::schema::FactRow;
use chrono::Datelike;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemporalKpis {
    pub morning_rush_demand: usize,
    pub evening_rush_demand: usize,
    pub rush_hour_split: RushHourSplit,
    pub weekend_vs_weekday_performance: WeekSplit,
    pub hourly_demand_pattern: BTreeMap<Hour, usize>,
    pub hourly_revenue: BTreeMap<Hour, f64>,
    pub day_of_week_performance: BTreeMap<String, PeriodPerformance>,
    /// Revenue per calendar month, keyed `YYYY-MM`.
    pub monthly_trends: BTreeMap<String, f64>,
    /// Percentage by which the mean rush-hour fare exceeds the off-peak fare.
    pub rush_hour_premium: Measure,
}

/// Trip count, revenue and mean fare over a subset of rides.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodPerformance {
    pub trips: usize,
    pub revenue: f64,
    pub avg_price: Measure,
}

impl PeriodPerformance {
    pub fn of<'a>(rows: impl IntoIterator<Item = &'a FactRow>) -> Self {
        let (trips, revenue) = rows
            .into_iter()
            .fold((0, 0.0), |(n, sum), r| (n + 1, sum + r.final_price));
        PeriodPerformance {
            trips,
            revenue,
            avg_price: Measure::ratio(revenue, trips as f64),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RushHourSplit {
    pub rush: PeriodPerformance,
    pub off_peak: PeriodPerformance,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekSplit {
    pub weekend: PeriodPerformance,
    pub weekday: PeriodPerformance,
}

pub fn month_key(row: &FactRow) -> String {
    format!("{:04}-{:02}", row.date.year(), row.date.month())
}

pub fn compute(fact: &[FactRow]) -> TemporalKpis {
    let rush = PeriodPerformance::of(fact.iter().filter(|r| r.hour.is_rush_hour()));
    let off_peak = PeriodPerformance::of(fact.iter().filter(|r| !r.hour.is_rush_hour()));
    let rush_hour_premium = rush
        .avg_price
        .zip_with(off_peak.avg_price, |rush, off| (rush - off) / off * 100.0);

    let mut day_of_week_performance = BTreeMap::new();
    for day in fact.iter().map(|r| day_name(r.date)) {
        day_of_week_performance.entry(day.to_string()).or_insert_with(|| {
            PeriodPerformance::of(fact.iter().filter(|r| day_name(r.date) == day))
        });
    }

    TemporalKpis {
        morning_rush_demand: fact.iter().filter(|r| r.hour.is_morning_rush()).count(),
        evening_rush_demand: fact.iter().filter(|r| r.hour.is_evening_rush()).count(),
        rush_hour_split: RushHourSplit { rush, off_peak },
        weekend_vs_weekday_performance: WeekSplit {
            weekend: PeriodPerformance::of(fact.iter().filter(|r| r.is_weekend)),
            weekday: PeriodPerformance::of(fact.iter().filter(|r| !r.is_weekend)),
        },
        hourly_demand_pattern: count_by(fact, |r| r.hour),
        hourly_revenue: sum_by(fact, |r| r.hour, |r| r.final_price),
        day_of_week_performance,
        monthly_trends: sum_by(fact, month_key, |r| r.final_price),
        rush_hour_premium,
    }
}
