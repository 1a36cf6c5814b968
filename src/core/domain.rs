use std::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::core::primitives::datetime_to_unix_seconds;

/// Chart family name used in diagnostics, one per horizontal-axis domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChartFamily {
    Time,
    Price,
    YieldCurve,
}

impl fmt::Display for ChartFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Time => "TimeChart",
            Self::Price => "PriceChart",
            Self::YieldCurve => "YieldCurveChart",
        };
        f.write_str(name)
    }
}

/// Horizontal-axis domain of a chart variant.
///
/// The three chart variants share every lifecycle rule and differ only in the
/// value type carried on the horizontal axis.
pub trait HorzDomain: 'static {
    type Value: Copy + PartialOrd + fmt::Debug + Serialize + DeserializeOwned + 'static;

    const FAMILY: ChartFamily;

    /// Monotonic projection of a horizontal value onto `f64`.
    fn ordinal(value: Self::Value) -> f64;
}

/// Calendar time axis (`DateTime<Utc>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarTime {}

/// Plain numeric axis (`f64`), e.g. option strikes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Numeric {}

/// Duration axis measured in whole months, e.g. yield-curve tenors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationMonths {}

impl HorzDomain for CalendarTime {
    type Value = DateTime<Utc>;

    const FAMILY: ChartFamily = ChartFamily::Time;

    fn ordinal(value: Self::Value) -> f64 {
        datetime_to_unix_seconds(value)
    }
}

impl HorzDomain for Numeric {
    type Value = f64;

    const FAMILY: ChartFamily = ChartFamily::Price;

    fn ordinal(value: Self::Value) -> f64 {
        value
    }
}

impl HorzDomain for DurationMonths {
    type Value = u32;

    const FAMILY: ChartFamily = ChartFamily::YieldCurve;

    fn ordinal(value: Self::Value) -> f64 {
        f64::from(value)
    }
}
