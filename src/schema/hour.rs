use crate::categorize::{Hour, HourCategory, TimePeriod};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourRow {
    pub hour: Hour,
    pub time_period: TimePeriod,
    pub is_business_hour: bool,
    pub is_rush_hour: bool,
    pub is_peak_demand: bool,
    pub hour_category: HourCategory,
}

impl From<Hour> for HourRow {
    fn from(hour: Hour) -> Self {
        HourRow {
            hour,
            time_period: hour.time_period(),
            is_business_hour: hour.is_business_hour(),
            is_rush_hour: hour.is_rush_hour(),
            is_peak_demand: hour.is_peak_demand(),
            hour_category: hour.category(),
        }
    }
}

/// Always exactly 24 rows, independent of the ride data.
pub fn build_hour_dimension() -> Vec<HourRow> {
    Hour::all().map(HourRow::from).collect()
}
