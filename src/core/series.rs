use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::primitives::{decimal_to_f64, is_strictly_increasing};
use crate::error::{ChartError, ChartResult};

/// Built-in series variants understood by every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    Line,
    Area,
    Baseline,
    Histogram,
    Bar,
    Candlestick,
}

impl SeriesKind {
    /// Returns `true` when points of this kind carry OHLC payloads.
    #[must_use]
    pub const fn is_ohlc(self) -> bool {
        matches!(self, Self::Bar | Self::Candlestick)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlc {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Ohlc {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> ChartResult<Self> {
        if !open.is_finite() || !high.is_finite() || !low.is_finite() || !close.is_finite() {
            return Err(ChartError::InvalidData(
                "ohlc values must be finite".to_owned(),
            ));
        }

        if low > high {
            return Err(ChartError::InvalidData(
                "ohlc low must be <= high".to_owned(),
            ));
        }

        if open < low || open > high || close < low || close > high {
            return Err(ChartError::InvalidData(
                "ohlc open/close must be within low/high range".to_owned(),
            ));
        }

        Ok(Self {
            open,
            high,
            low,
            close,
        })
    }
}

/// Value payload of one data point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SeriesData {
    /// Occupies a horizontal slot without a value.
    Whitespace,
    Value(f64),
    Ohlc(Ohlc),
    /// Payload interpreted by a custom series view.
    Custom(serde_json::Value),
}

impl SeriesData {
    #[must_use]
    pub fn is_whitespace(&self) -> bool {
        matches!(self, Self::Whitespace)
    }

    /// Single representative value: the value itself, the OHLC close, or a
    /// numeric custom payload.
    #[must_use]
    pub fn primary_value(&self) -> Option<f64> {
        match self {
            Self::Whitespace => None,
            Self::Value(value) => Some(*value),
            Self::Ohlc(bar) => Some(bar.close),
            Self::Custom(value) => value.as_f64(),
        }
    }
}

/// One data point: horizontal-axis value plus payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint<X> {
    pub horz: X,
    pub data: SeriesData,
}

impl<X> SeriesPoint<X> {
    #[must_use]
    pub fn value(horz: X, value: f64) -> Self {
        Self {
            horz,
            data: SeriesData::Value(value),
        }
    }

    #[must_use]
    pub fn ohlc(horz: X, bar: Ohlc) -> Self {
        Self {
            horz,
            data: SeriesData::Ohlc(bar),
        }
    }

    #[must_use]
    pub fn whitespace(horz: X) -> Self {
        Self {
            horz,
            data: SeriesData::Whitespace,
        }
    }

    pub fn from_decimal(horz: X, value: Decimal) -> ChartResult<Self> {
        Ok(Self::value(horz, decimal_to_f64(value, "value")?))
    }
}

/// Checks that horizontal values are strictly increasing and unique.
pub fn validate_series_points<X: PartialOrd + Copy>(points: &[SeriesPoint<X>]) -> ChartResult<()> {
    if !is_strictly_increasing(points, |point| point.horz) {
        return Err(ChartError::InvalidData(
            "series horizontal values must be strictly increasing and unique".to_owned(),
        ));
    }
    for point in points {
        if let SeriesData::Value(value) = point.data {
            if !value.is_finite() {
                return Err(ChartError::InvalidData(
                    "series value must be finite".to_owned(),
                ));
            }
        }
    }
    Ok(())
}
