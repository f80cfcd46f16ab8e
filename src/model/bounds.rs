//! Range checks shared by the model's `Deserialize` impls.

use serde::de::{self, Deserialize, Deserializer};

use crate::error::LetxbeError;

pub(crate) const PERCENT_MAX: f64 = 100.0;
pub(crate) const ROTATION_MAX: f64 = 180.0;

/// Returns `value` if it lies in `[min, max]`. NaN is always rejected.
pub(crate) fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: f64,
) -> Result<f64, LetxbeError> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(LetxbeError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

pub(crate) fn percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    check_range("percentage", value, 0.0, PERCENT_MAX).map_err(de::Error::custom)
}

pub(crate) fn optional_percentage<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Option::<f64>::deserialize(deserializer)?
        .map(|value| check_range("percentage", value, 0.0, PERCENT_MAX))
        .transpose()
        .map_err(de::Error::custom)
}

pub(crate) fn optional_rotation<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<f64>, D::Error> {
    Option::<f64>::deserialize(deserializer)?
        .map(|value| check_range("rotation", value, -ROTATION_MAX, ROTATION_MAX))
        .transpose()
        .map_err(de::Error::custom)
}
