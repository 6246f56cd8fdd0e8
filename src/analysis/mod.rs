//! Supplementary analyses layered on the fact table.
//!
//! Each analysis is a standalone JSON document next to the KPI catalog. They
//! reuse the KPI reductions but slice the rides first (rush windows, day
//! type, weather condition).

pub mod insights;
pub mod rush_hour;
pub mod weather;
pub mod weekend;

pub use insights::{BusinessInsights, ExecutiveSummary, SummaryReport};
pub use rush_hour::RushHourAnalysis;
pub use weather::WeatherAnalysis;
pub use weekend::WeekendAnalysis;

use crate::schema::FactRow;

/// Owned subset of the fact table matching `predicate`.
pub(crate) fn slice(fact: &[FactRow], predicate: impl Fn(&FactRow) -> bool) -> Vec<FactRow> {
    fact.iter().filter(|r| predicate(r)).cloned().collect()
}
