//! Pure mappings from clock hours and calendar dates to categorical labels.

use crate::error::CategorizeError;
use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Serialize, Serializer};
use std::fmt;

/// Morning and evening rush hours.
pub const RUSH_HOURS: [u8; 4] = [8, 9, 17, 18];

/// Rush hours plus the first evening hour.
pub const PEAK_DEMAND_HOURS: [u8; 5] = [8, 9, 17, 18, 19];

/// An hour of day, guaranteed to lie in `0..=23`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Hour(u8);

impl Hour {
    pub fn new(hour: i64) -> Result<Self, CategorizeError> {
        match u8::try_from(hour) {
            Ok(h) if h < 24 => Ok(Self(h)),
            _ => Err(CategorizeError::InvalidInput(hour)),
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All 24 hours in ascending order.
    pub fn all() -> impl Iterator<Item = Hour> {
        (0..24).map(Hour)
    }

    pub fn time_period(self) -> TimePeriod {
        TimePeriod::of(self)
    }

    pub fn category(self) -> HourCategory {
        HourCategory::of(self)
    }

    pub fn is_rush_hour(self) -> bool {
        RUSH_HOURS.contains(&self.0)
    }

    pub fn is_morning_rush(self) -> bool {
        (8..=9).contains(&self.0)
    }

    pub fn is_evening_rush(self) -> bool {
        (17..=18).contains(&self.0)
    }

    pub fn is_peak_demand(self) -> bool {
        PEAK_DEMAND_HOURS.contains(&self.0)
    }

    pub fn is_business_hour(self) -> bool {
        (9..=18).contains(&self.0)
    }
}

impl fmt::Display for Hour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fine-grained time of day. Bins are half-open and cover `[0, 24)`.
///
/// | Hours   | Period        |
/// |---------|---------------|
/// | 0–5     | Late Night    |
/// | 6–7     | Early Morning |
/// | 8–9     | Morning Rush  |
/// | 10–11   | Late Morning  |
/// | 12–13   | Lunch Time    |
/// | 14–16   | Afternoon     |
/// | 17–18   | Evening Rush  |
/// | 19–21   | Evening       |
/// | 22–23   | Night         |
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimePeriod {
    LateNight,
    EarlyMorning,
    MorningRush,
    LateMorning,
    LunchTime,
    Afternoon,
    EveningRush,
    Evening,
    Night,
}

impl TimePeriod {
    pub fn of(hour: Hour) -> Self {
        match hour.get() {
            0..6 => Self::LateNight,
            6..8 => Self::EarlyMorning,
            8..10 => Self::MorningRush,
            10..12 => Self::LateMorning,
            12..14 => Self::LunchTime,
            14..17 => Self::Afternoon,
            17..19 => Self::EveningRush,
            19..22 => Self::Evening,
            _ => Self::Night,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::LateNight => "Late Night",
            Self::EarlyMorning => "Early Morning",
            Self::MorningRush => "Morning Rush",
            Self::LateMorning => "Late Morning",
            Self::LunchTime => "Lunch Time",
            Self::Afternoon => "Afternoon",
            Self::EveningRush => "Evening Rush",
            Self::Evening => "Evening",
            Self::Night => "Night",
        }
    }
}

/// Coarse four-bucket split of the day. Boundaries are right-closed:
/// 0–6 Night, 7–12 Morning, 13–18 Afternoon, 19–23 Evening.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HourCategory {
    Night,
    Morning,
    Afternoon,
    Evening,
}

impl HourCategory {
    pub fn of(hour: Hour) -> Self {
        match hour.get() {
            0..=6 => Self::Night,
            7..=12 => Self::Morning,
            13..=18 => Self::Afternoon,
            _ => Self::Evening,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Night => "Night",
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter,
    Spring,
    Summer,
    Autumn,
}

impl Season {
    /// Meteorological seasons: Dec–Feb, Mar–May, Jun–Aug, Sep–Nov.
    pub fn of_month(month: u32) -> Self {
        match month {
            12 | 1 | 2 => Self::Winter,
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            _ => Self::Autumn,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
        }
    }
}

macro_rules! serialize_as_label {
    ($($ty:ty),*) => {
        $(
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.label())
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.label())
                }
            }
        )*
    };
}

serialize_as_label!(TimePeriod, HourCategory, Season);

/// Weekday index with Monday = 0.
pub fn weekday_index(date: NaiveDate) -> u32 {
    date.weekday().num_days_from_monday()
}

/// Saturday (5) and Sunday (6) are weekend days.
pub fn is_weekend_index(index: u32) -> bool {
    matches!(index, 5 | 6)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    is_weekend_index(weekday_index(date))
}

pub fn day_name(date: NaiveDate) -> &'static str {
    match date.weekday() {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}
