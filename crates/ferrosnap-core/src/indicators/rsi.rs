use super::{IndicatorValue, UnavailableReason};
use crate::BarSeries;

/// Wilder RSI over closing prices.
///
/// The first average gain and loss are the simple means of the first
/// `lookback` deltas; later deltas are folded in with Wilder smoothing,
/// `avg = (avg * (lookback - 1) + x) / lookback`.
pub fn rsi(series: &BarSeries, lookback: usize) -> IndicatorValue {
    if lookback == 0 {
        return IndicatorValue::unavailable(UnavailableReason::InvalidLookback);
    }

    let closes = series.closes().collect::<Vec<_>>();
    if closes.len() <= lookback {
        return IndicatorValue::unavailable(UnavailableReason::InsufficientData);
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = closes
        .windows(2)
        .map(|pair| {
            let delta = pair[1] - pair[0];
            (delta.max(0.0), (-delta).max(0.0))
        })
        .unzip();

    let period = lookback as f64;
    let mut avg_gain = gains[..lookback].iter().sum::<f64>() / period;
    let mut avg_loss = losses[..lookback].iter().sum::<f64>() / period;
    for (gain, loss) in gains[lookback..].iter().zip(&losses[lookback..]) {
        avg_gain = (avg_gain * (period - 1.0) + gain) / period;
        avg_loss = (avg_loss * (period - 1.0) + loss) / period;
    }

    if !avg_gain.is_finite() || !avg_loss.is_finite() {
        return IndicatorValue::unavailable(UnavailableReason::NonFinitePrice);
    }
    if avg_loss == 0.0 {
        return if avg_gain > 0.0 {
            IndicatorValue::numeric(100.0)
        } else {
            IndicatorValue::unavailable(UnavailableReason::NoPriceMovement)
        };
    }

    let rs = avg_gain / avg_loss;
    IndicatorValue::numeric(100.0 - 100.0 / (1.0 + rs))
}
