//! Pipeline tuning knobs.
//!
//! Every field has a default, so the config file is optional and may be
//! partial. Stored as a plain JSON object on disk:
//! ```json
//! {
//!   "point_of_interest": "VIT",
//!   "holidays": ["2024-01-26", "2024-08-15"],
//!   "top_n_routes": 10
//! }
//! ```

use crate::error::{PipelineError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Dates flagged as holidays in the time dimension.
    pub holidays: Vec<NaiveDate>,
    /// Substring matched against route endpoints for the point-of-interest KPI.
    pub point_of_interest: String,
    pub top_n_routes: usize,
    pub top_n_destinations: usize,
    /// Estimated in-vehicle minutes per km, used by revenue per minute.
    pub minutes_per_km: f64,
    /// Rides above this multiplier count as surged.
    pub surge_threshold: f64,
    pub wait_threshold_minutes: f64,
    pub premium_threshold_percent: f64,
    /// Routes listed per rush window in the rush-hour analysis.
    pub rush_route_limit: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            holidays: default_holidays(),
            point_of_interest: "VIT".to_string(),
            top_n_routes: 10,
            top_n_destinations: 10,
            minutes_per_km: 3.0,
            surge_threshold: 1.2,
            wait_threshold_minutes: 5.0,
            premium_threshold_percent: 30.0,
            rush_route_limit: 5,
        }
    }
}

fn default_holidays() -> Vec<NaiveDate> {
    [
        (1, 26),
        (3, 8),
        (4, 14),
        (8, 15),
        (10, 2),
        (10, 31),
        (12, 25),
    ]
    .into_iter()
    .filter_map(|(m, d)| NaiveDate::from_ymd_opt(2024, m, d))
    .collect()
}

impl PipelineConfig {
    /// Loads the config from a JSON file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |message: String| PipelineError::Config {
            path: path.to_path_buf(),
            message,
        };
        let content = std::fs::read_to_string(path).map_err(|e| config_error(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| config_error(e.to_string()))
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }
}
