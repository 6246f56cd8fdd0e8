//! Calendar dimension: one row per day between the first and last ride date.

use crate::categorize::{self, Season};
use crate::config::PipelineConfig;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeRow {
    pub date: NaiveDate,
    pub date_key: u32,
    pub year: i32,
    pub quarter: u32,
    pub month: u32,
    pub month_name: &'static str,
    pub week_of_year: u32,
    pub day_of_year: u32,
    pub day_of_month: u32,
    pub day_of_week: u32,
    pub day_name: &'static str,
    pub is_weekend: bool,
    pub is_month_start: bool,
    pub is_month_end: bool,
    pub is_quarter_start: bool,
    pub is_quarter_end: bool,
    pub fiscal_year: i32,
    pub fiscal_quarter: u32,
    pub season: Season,
    pub is_holiday: bool,
}

impl TimeRow {
    pub fn new(date: NaiveDate, config: &PipelineConfig) -> Self {
        let month = date.month();
        let quarter = (month - 1) / 3 + 1;
        let is_month_start = date.day() == 1;
        let is_month_end = date.succ_opt().is_none_or(|next| next.month() != month);
        let quarter_first_month = (quarter - 1) * 3 + 1;
        let day_of_week = categorize::weekday_index(date);

        TimeRow {
            date,
            date_key: date.year() as u32 * 10_000 + month * 100 + date.day(),
            year: date.year(),
            quarter,
            month,
            month_name: categorize::month_name(month),
            week_of_year: date.iso_week().week(),
            day_of_year: date.ordinal(),
            day_of_month: date.day(),
            day_of_week,
            day_name: categorize::day_name(date),
            is_weekend: categorize::is_weekend_index(day_of_week),
            is_month_start,
            is_month_end,
            is_quarter_start: is_month_start && month == quarter_first_month,
            is_quarter_end: is_month_end && month == quarter_first_month + 2,
            fiscal_year: date.year(),
            fiscal_quarter: quarter,
            season: Season::of_month(month),
            is_holiday: config.is_holiday(date),
        }
    }
}

/// Enumerates every day from the earliest to the latest of `dates`, so days
/// without rides still get a row. Empty input yields an empty table.
pub fn build_time_dimension(
    dates: impl IntoIterator<Item = NaiveDate>,
    config: &PipelineConfig,
) -> Vec<TimeRow> {
    let (first, last) = match dates.into_iter().fold(None, |acc, d| match acc {
        None => Some((d, d)),
        Some((lo, hi)) => Some((d.min(lo), d.max(hi))),
    }) {
        Some(range) => range,
        None => return Vec::new(),
    };

    first
        .iter_days()
        .take_while(|d| *d <= last)
        .map(|d| TimeRow::new(d, config))
        .collect()
}
