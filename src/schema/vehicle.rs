use crate::model::VehicleType;
use serde::Serialize;
use std::collections::HashSet;

/// Vehicle dimension row. Lookup attributes stay empty for categories that
/// are not in the fixed profile table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VehicleRow {
    pub vehicle_type: VehicleType,
    pub vehicle_id: usize,
    pub capacity: Option<u8>,
    pub base_fare_per_km: Option<f64>,
    pub surge_sensitivity: Option<&'static str>,
    pub weather_impact: Option<&'static str>,
    pub category: Option<&'static str>,
}

impl VehicleRow {
    fn new(vehicle_type: VehicleType, vehicle_id: usize) -> Self {
        let profile = vehicle_type.profile();
        VehicleRow {
            vehicle_id,
            capacity: profile.map(|p| p.capacity),
            base_fare_per_km: profile.map(|p| p.base_fare_per_km),
            surge_sensitivity: profile.map(|p| p.surge_sensitivity),
            weather_impact: profile.map(|p| p.weather_impact),
            category: profile.map(|p| p.category),
            vehicle_type,
        }
    }
}

/// One row per distinct vehicle category, in first-encountered order.
pub fn build_vehicle_dimension<'a>(
    vehicles: impl IntoIterator<Item = &'a VehicleType>,
) -> Vec<VehicleRow> {
    let mut seen = HashSet::new();
    vehicles
        .into_iter()
        .filter(|v| seen.insert(*v))
        .enumerate()
        .map(|(i, v)| VehicleRow::new(v.clone(), i + 1))
        .collect()
}
