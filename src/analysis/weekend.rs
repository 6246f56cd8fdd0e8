use super::slice;
use crate::categorize::Hour;
use crate::kpi::{Breakdown, Measure, Ranked, count_by, mean_by, mean_of, ranked_groups, top_n};
use crate::schema::FactRow;
use serde::Serialize;

const PEAK_HOURS: usize = 3;
const TOP_DESTINATIONS: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekendAnalysis {
    pub weekend_patterns: DayTypePattern,
    pub weekday_patterns: DayTypePattern,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTypePattern {
    /// Busiest hours, most trips first; ties go to the earlier hour.
    pub peak_hours: Vec<Hour>,
    pub total_revenue: f64,
    pub avg_trip_distance: Measure,
    pub popular_destinations: Vec<Ranked>,
    /// Mean surge multiplier per weather condition.
    pub weather_sensitivity: Breakdown,
}

impl DayTypePattern {
    fn of(rows: &[FactRow]) -> Self {
        let mut hours: Vec<(Hour, usize)> = count_by(rows, |r| r.hour).into_iter().collect();
        hours.sort_by(|a, b| b.1.cmp(&a.1));

        let destinations = ranked_groups(rows, |r| r.to_location.clone(), |trips| {
            Some(trips.len() as f64)
        });

        DayTypePattern {
            peak_hours: hours.into_iter().take(PEAK_HOURS).map(|(h, _)| h).collect(),
            total_revenue: rows.iter().map(|r| r.final_price).sum(),
            avg_trip_distance: mean_of(rows, |r| r.distance_km),
            popular_destinations: top_n(destinations, TOP_DESTINATIONS),
            weather_sensitivity: mean_by(
                rows,
                |r| r.weather_condition.to_string(),
                |r| r.surge_multiplier,
            ),
        }
    }
}

pub fn analyze(fact: &[FactRow]) -> WeekendAnalysis {
    WeekendAnalysis {
        weekend_patterns: DayTypePattern::of(&slice(fact, |r| r.is_weekend)),
        weekday_patterns: DayTypePattern::of(&slice(fact, |r| !r.is_weekend)),
    }
}
