use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::error::{ChartError, ChartResult};

pub fn decimal_to_f64(value: Decimal, field_name: &str) -> ChartResult<f64> {
    value.to_f64().ok_or_else(|| {
        ChartError::InvalidData(format!("{field_name} cannot be represented as f64"))
    })
}

#[must_use]
pub fn datetime_to_unix_seconds(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64 / 1000.0
}

/// Returns `true` when every `key(item)` is strictly greater than the previous one.
///
/// Incomparable keys (`NaN`) count as a violation.
pub fn is_strictly_increasing<T, K, F>(items: &[T], mut key: F) -> bool
where
    K: PartialOrd,
    F: FnMut(&T) -> K,
{
    items
        .windows(2)
        .all(|pair| key(&pair[0]).partial_cmp(&key(&pair[1])) == Some(std::cmp::Ordering::Less))
}
