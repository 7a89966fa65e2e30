use serde::{Deserialize, Serialize};

use crate::presentation::serialize_round2;
use crate::{Interval, Symbol, UtcDateTime, ValidationError};

/// OHLCV bar record for a given interval. Prices keep full precision and
/// are rounded to cents only when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub ts: UtcDateTime,
    #[serde(serialize_with = "serialize_round2")]
    pub open: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub high: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub low: f64,
    #[serde(serialize_with = "serialize_round2")]
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    pub fn new(
        ts: UtcDateTime,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: u64,
    ) -> Result<Self, ValidationError> {
        validate_non_negative("open", open)?;
        validate_non_negative("high", high)?;
        validate_non_negative("low", low)?;
        validate_non_negative("close", close)?;

        if high < low {
            return Err(ValidationError::InvalidBarRange);
        }

        if open < low || open > high || close < low || close > high {
            return Err(ValidationError::InvalidBarBounds);
        }

        Ok(Self {
            ts,
            open,
            high,
            low,
            close,
            volume,
        })
    }

    /// `(high + low + close) / 3`, shared by VWAP and pivot computation.
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }
}

/// Non-empty, strictly time-ascending run of bars for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BarSeries {
    symbol: Symbol,
    interval: Interval,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: Symbol, interval: Interval, bars: Vec<Bar>) -> Result<Self, ValidationError> {
        if bars.is_empty() {
            return Err(ValidationError::EmptySeries);
        }

        if let Some(index) = bars
            .windows(2)
            .position(|pair| pair[0].ts >= pair[1].ts)
        {
            return Err(ValidationError::UnorderedSeries { index: index + 1 });
        }

        Ok(Self {
            symbol,
            interval,
            bars,
        })
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub const fn interval(&self) -> Interval {
        self.interval
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Always false; kept for the `len`/`is_empty` pairing.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn latest(&self) -> &Bar {
        // Construction rejects empty input, so the last bar always exists.
        &self.bars[self.bars.len() - 1]
    }

    pub fn closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().map(|bar| bar.close)
    }
}

fn validate_non_negative(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NonFiniteValue { field });
    }
    if value < 0.0 {
        return Err(ValidationError::NegativeValue { field });
    }
    Ok(())
}
