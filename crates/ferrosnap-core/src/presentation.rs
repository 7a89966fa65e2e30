//! Output-boundary formatting. Indicator math keeps full precision; values
//! are rounded only when serialized.

use serde::Serializer;

/// Rounds half away from zero to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `serialize_with` adapter for [`round2`].
pub fn serialize_round2<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(round2(*value))
}
