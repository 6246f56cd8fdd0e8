//! Guarded numeric values.

use serde::{Serialize, Serializer};
use std::fmt;

/// Text written in place of a value whose computation has no defined result.
pub const NOT_APPLICABLE: &str = "not_applicable";

/// A numeric result that may be undefined.
///
/// Zero denominators and degenerate correlations produce [`Measure::Undefined`]
/// instead of NaN or infinity. It serializes as the string
/// [`NOT_APPLICABLE`], so it never collapses into `null` or `0` downstream.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Measure {
    Value(f64),
    Undefined,
}

impl Measure {
    /// Wraps `value`, mapping NaN and infinities to `Undefined`.
    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self::Value(value)
        } else {
            Self::Undefined
        }
    }

    /// `numerator / denominator`, undefined when the denominator is zero.
    pub fn ratio(numerator: f64, denominator: f64) -> Self {
        if denominator == 0.0 {
            Self::Undefined
        } else {
            Self::new(numerator / denominator)
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Undefined => None,
        }
    }

    pub fn or_zero(self) -> f64 {
        self.value().unwrap_or(0.0)
    }

    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Self::Value(v) => Self::new(f(v)),
            Self::Undefined => Self::Undefined,
        }
    }

    /// Combines two defined values; undefined if either side is.
    pub fn zip_with(self, other: Measure, f: impl FnOnce(f64, f64) -> f64) -> Self {
        match (self, other) {
            (Self::Value(a), Self::Value(b)) => Self::new(f(a, b)),
            _ => Self::Undefined,
        }
    }

    pub fn round2(self) -> Self {
        self.map(round2)
    }
}

impl From<Option<f64>> for Measure {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Undefined, Self::new)
    }
}

impl Serialize for Measure {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::Undefined => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => write!(f, "{v:.2}"),
            Self::Undefined => f.write_str(NOT_APPLICABLE),
        }
    }
}

/// Rounds half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_with_zero_denominator() {
        assert_eq!(Measure::ratio(10.0, 0.0), Measure::Undefined);
        assert_eq!(Measure::ratio(0.0, 0.0), Measure::Undefined);
    }

    #[test]
    fn test_ratio_normal_values() {
        assert_eq!(Measure::ratio(90.0, 45.0), Measure::Value(2.0));
    }

    #[test]
    fn test_non_finite_becomes_undefined() {
        assert_eq!(Measure::new(f64::NAN), Measure::Undefined);
        assert_eq!(Measure::new(f64::INFINITY), Measure::Undefined);
        assert_eq!(Measure::Value(1.0).map(|v| v / 0.0), Measure::Undefined);
    }

    #[test]
    fn test_serializes_sentinel_as_text() {
        let json = serde_json::to_string(&vec![Measure::Value(1.5), Measure::Undefined]).unwrap();
        assert_eq!(json, r#"[1.5,"not_applicable"]"#);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(19.354838), 19.35);
        assert_eq!(Measure::Value(2.346).round2(), Measure::Value(2.35));
    }
}
