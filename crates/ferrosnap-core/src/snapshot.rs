use serde::Serialize;

use crate::indicators::{
    pivot_levels, rsi, vwap, IndicatorConfig, IndicatorValue, LevelPair,
};
use crate::routing::Provenance;
use crate::{Bar, BarSeries, Interval, Symbol};

/// Point-in-time technical view of one symbol.
///
/// Built once by [`assemble`] and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSnapshot {
    symbol: Symbol,
    interval: Interval,
    bar_count: usize,
    latest_bar: Bar,
    rsi: IndicatorValue,
    vwap: IndicatorValue,
    pivot: IndicatorValue,
    support_levels: LevelPair,
    resistance_levels: LevelPair,
    provenance: Provenance,
}

impl MarketSnapshot {
    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub const fn interval(&self) -> Interval {
        self.interval
    }

    pub const fn bar_count(&self) -> usize {
        self.bar_count
    }

    pub fn latest_bar(&self) -> &Bar {
        &self.latest_bar
    }

    pub const fn rsi(&self) -> IndicatorValue {
        self.rsi
    }

    pub const fn vwap(&self) -> IndicatorValue {
        self.vwap
    }

    pub const fn pivot(&self) -> IndicatorValue {
        self.pivot
    }

    pub const fn support_levels(&self) -> LevelPair {
        self.support_levels
    }

    pub const fn resistance_levels(&self) -> LevelPair {
        self.resistance_levels
    }

    pub const fn provenance(&self) -> Provenance {
        self.provenance
    }
}

/// Runs every indicator over `series` and packages the results.
///
/// Indicators are computed independently; one being unavailable never
/// affects the others.
pub fn assemble(
    series: &BarSeries,
    provenance: Provenance,
    config: &IndicatorConfig,
) -> MarketSnapshot {
    let latest_bar = series.latest().clone();

    let (pivot, support_levels, resistance_levels) = match pivot_levels(&latest_bar) {
        Ok(levels) => (
            IndicatorValue::from(&levels),
            levels.support(),
            levels.resistance(),
        ),
        Err(reason) => (
            IndicatorValue::unavailable(reason),
            LevelPair::unavailable(reason),
            LevelPair::unavailable(reason),
        ),
    };

    MarketSnapshot {
        symbol: series.symbol().clone(),
        interval: series.interval(),
        bar_count: series.len(),
        rsi: rsi(series, config.rsi_lookback),
        vwap: vwap(series),
        pivot,
        support_levels,
        resistance_levels,
        latest_bar,
        provenance,
    }
}
