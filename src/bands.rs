//! Fixed ordinal bands for continuous measures.
//!
//! All bands are right-closed: a value sitting exactly on a boundary falls
//! into the lower band. Values at or below zero fall outside every band.

/// Average trip distance of a route, in km.
///
/// | Range       | Band       |
/// |-------------|------------|
/// | (0, 5]      | Short      |
/// | (5, 10]     | Medium     |
/// | (10, 15]    | Long       |
/// | > 15        | Extra Long |
pub fn distance_band(km: f64) -> Option<&'static str> {
    match km {
        d if d.is_nan() || d <= 0.0 => None,
        d if d <= 5.0 => Some("Short"),
        d if d <= 10.0 => Some("Medium"),
        d if d <= 15.0 => Some("Long"),
        _ => Some("Extra Long"),
    }
}

/// Trip count of a route.
///
/// | Range       | Band      |
/// |-------------|-----------|
/// | (0, 50]     | Low       |
/// | (50, 200]   | Medium    |
/// | (200, 500]  | High      |
/// | > 500       | Very High |
pub fn popularity_band(trips: usize) -> Option<&'static str> {
    match trips {
        0 => None,
        1..=50 => Some("Low"),
        51..=200 => Some("Medium"),
        201..=500 => Some("High"),
        _ => Some("Very High"),
    }
}

/// Final price of a single ride.
///
/// | Range       | Band    |
/// |-------------|---------|
/// | (0, 50]     | Low     |
/// | (50, 100]   | Medium  |
/// | (100, 200]  | High    |
/// | > 200       | Premium |
pub fn revenue_band(price: f64) -> Option<&'static str> {
    match price {
        p if p.is_nan() || p <= 0.0 => None,
        p if p <= 50.0 => Some("Low"),
        p if p <= 100.0 => Some("Medium"),
        p if p <= 200.0 => Some("High"),
        _ => Some("Premium"),
    }
}

/// Surge multiplier of a single ride.
///
/// | Range       | Band       |
/// |-------------|------------|
/// | (0, 1.2]    | Normal     |
/// | (1.2, 1.5]  | Low Surge  |
/// | (1.5, 2.0]  | High Surge |
/// | > 2.0       | Peak Surge |
pub fn surge_band(multiplier: f64) -> Option<&'static str> {
    match multiplier {
        m if m.is_nan() || m <= 0.0 => None,
        m if m <= 1.2 => Some("Normal"),
        m if m <= 1.5 => Some("Low Surge"),
        m if m <= 2.0 => Some("High Surge"),
        _ => Some("Peak Surge"),
    }
}
