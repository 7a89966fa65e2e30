//! Technical indicators over an already fetched [`BarSeries`](crate::BarSeries).
//!
//! Every function here is pure. An indicator that cannot be computed returns
//! [`IndicatorValue::Unavailable`] with a reason instead of failing the
//! request.

mod pivots;
mod rsi;
mod vwap;

pub use pivots::{pivot_levels, LevelPair, PivotLevels};
pub use rsi::rsi;
pub use vwap::vwap;

use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::presentation::serialize_round2;

pub const DEFAULT_RSI_LOOKBACK: usize = 14;

/// Why an indicator has no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum UnavailableReason {
    #[serde(rename = "insufficient data")]
    InsufficientData,
    #[serde(rename = "no price movement")]
    NoPriceMovement,
    #[serde(rename = "zero volume")]
    ZeroVolume,
    #[serde(rename = "invalid lookback")]
    InvalidLookback,
    #[serde(rename = "non-finite price")]
    NonFinitePrice,
}

impl UnavailableReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InsufficientData => "insufficient data",
            Self::NoPriceMovement => "no price movement",
            Self::ZeroVolume => "zero volume",
            Self::InvalidLookback => "invalid lookback",
            Self::NonFinitePrice => "non-finite price",
        }
    }
}

impl Display for UnavailableReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Indicator output: a number or an explicit reason it is missing.
///
/// Serializes as `{"status":"numeric","value":12.34}` or
/// `{"status":"unavailable","reason":"zero volume"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndicatorValue {
    Numeric {
        #[serde(serialize_with = "serialize_round2")]
        value: f64,
    },
    Unavailable {
        reason: UnavailableReason,
    },
}

impl IndicatorValue {
    /// Wraps `value`, mapping NaN and infinities to `non-finite price`.
    pub fn numeric(value: f64) -> Self {
        if value.is_finite() {
            Self::Numeric { value }
        } else {
            Self::Unavailable {
                reason: UnavailableReason::NonFinitePrice,
            }
        }
    }

    pub const fn unavailable(reason: UnavailableReason) -> Self {
        Self::Unavailable { reason }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Numeric { value } => Some(*value),
            Self::Unavailable { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<UnavailableReason> {
        match self {
            Self::Numeric { .. } => None,
            Self::Unavailable { reason } => Some(*reason),
        }
    }
}

/// Tunable indicator parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndicatorConfig {
    pub rsi_lookback: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_lookback: DEFAULT_RSI_LOOKBACK,
        }
    }
}

impl IndicatorConfig {
    pub fn with_rsi_lookback(mut self, rsi_lookback: usize) -> Self {
        self.rsi_lookback = rsi_lookback;
        self
    }
}
