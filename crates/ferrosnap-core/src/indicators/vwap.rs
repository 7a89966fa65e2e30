use super::{IndicatorValue, UnavailableReason};
use crate::BarSeries;

/// Volume-weighted average of the typical price `(H + L + C) / 3`,
/// accumulated from the first bar through the latest one.
pub fn vwap(series: &BarSeries) -> IndicatorValue {
    let (weighted, volume) = series
        .bars()
        .iter()
        .fold((0.0_f64, 0.0_f64), |(weighted, volume), bar| {
            let bar_volume = bar.volume as f64;
            (weighted + bar.typical_price() * bar_volume, volume + bar_volume)
        });

    if volume == 0.0 {
        return IndicatorValue::unavailable(UnavailableReason::ZeroVolume);
    }

    IndicatorValue::numeric(weighted / volume)
}
