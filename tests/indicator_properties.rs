//! Property tests for the indicator invariants.

mod support;

use ferrosnap_core::indicators::{pivot_levels, rsi, vwap};
use ferrosnap_core::{Bar, BarSeries, IndicatorValue, Interval, UnavailableReason, UtcDateTime};
use proptest::prelude::*;
use support::{daily_series, symbol, DAY, JAN_1_2024};

// ── Strategies ───────────────────────────────────────────────────────

fn arb_lookback() -> impl Strategy<Value = usize> {
    1_usize..30
}

fn arb_step() -> impl Strategy<Value = f64> {
    (0.01..10.0_f64).prop_map(|step| (step * 100.0).round() / 100.0)
}

fn walk(start: f64, steps: &[f64], direction: f64) -> Vec<f64> {
    let mut closes = Vec::with_capacity(steps.len() + 1);
    closes.push(start);
    for step in steps {
        let last = closes[closes.len() - 1];
        closes.push(last + direction * step);
    }
    closes
}

fn approx_eq(left: f64, right: f64) -> bool {
    (left - right).abs() <= 1e-9 * left.abs().max(right.abs()).max(1.0)
}

// ── RSI ──────────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn strictly_rising_closes_give_rsi_of_one_hundred(
        (lookback, steps) in arb_lookback()
            .prop_flat_map(|n| (Just(n), prop::collection::vec(arb_step(), n))),
        start in 10.0..500.0_f64,
    ) {
        let series = daily_series("UP", &walk(start, &steps, 1.0), 1_000);
        prop_assert_eq!(rsi(&series, lookback), IndicatorValue::Numeric { value: 100.0 });
    }

    #[test]
    fn strictly_falling_closes_give_rsi_of_zero(
        (lookback, steps) in arb_lookback()
            .prop_flat_map(|n| (Just(n), prop::collection::vec(arb_step(), n))),
        start in 1_000.0..5_000.0_f64,
    ) {
        let series = daily_series("DOWN", &walk(start, &steps, -1.0), 1_000);
        prop_assert_eq!(rsi(&series, lookback), IndicatorValue::Numeric { value: 0.0 });
    }

    #[test]
    fn short_series_has_insufficient_data(
        (lookback, len) in (2_usize..30).prop_flat_map(|n| (Just(n), 1..=n)),
        price in 5.0..500.0_f64,
    ) {
        let series = daily_series("SHORT", &vec![price; len], 1_000);
        prop_assert_eq!(
            rsi(&series, lookback).reason(),
            Some(UnavailableReason::InsufficientData)
        );
    }

    #[test]
    fn numeric_rsi_stays_within_bounds(
        closes in prop::collection::vec(5.0..500.0_f64, 2..60),
        lookback in 1_usize..20,
    ) {
        let series = daily_series("ANY", &closes, 1_000);
        if let Some(value) = rsi(&series, lookback).value() {
            prop_assert!((0.0..=100.0).contains(&value), "rsi {} out of bounds", value);
        }
    }
}

// ── VWAP ─────────────────────────────────────────────────────────────

fn flat_series(price: f64, volumes: &[u64]) -> BarSeries {
    let bars = volumes
        .iter()
        .enumerate()
        .map(|(index, &volume)| {
            let ts = UtcDateTime::from_unix_timestamp(JAN_1_2024 + index as i64 * DAY)
                .expect("valid ts");
            Bar::new(ts, price, price, price, price, volume).expect("valid bar")
        })
        .collect();
    BarSeries::new(symbol("FLAT"), Interval::OneDay, bars).expect("valid series")
}

proptest! {
    #[test]
    fn constant_price_vwap_equals_price(
        price in 0.5..5_000.0_f64,
        volumes in prop::collection::vec(1_u64..1_000_000, 1..50),
    ) {
        let value = vwap(&flat_series(price, &volumes)).value();
        prop_assert!(value.is_some());
        prop_assert!(approx_eq(value.unwrap_or_default(), price));
    }

    #[test]
    fn zero_volume_everywhere_is_unavailable(len in 1_usize..20, price in 1.0..100.0_f64) {
        let value = vwap(&flat_series(price, &vec![0; len]));
        prop_assert_eq!(value.reason(), Some(UnavailableReason::ZeroVolume));
    }
}

// ── Pivots ───────────────────────────────────────────────────────────

fn bar_at(high: f64, low: f64, close: f64) -> Bar {
    let ts = UtcDateTime::from_unix_timestamp(JAN_1_2024).expect("valid ts");
    Bar::new(ts, close, high, low, close, 10).expect("valid bar")
}

proptest! {
    #[test]
    fn outer_pair_is_symmetric_and_inner_pair_spans_range(
        low in 1.0..1_000.0_f64,
        span in 0.01..100.0_f64,
        close_frac in 0.0..=1.0_f64,
    ) {
        let high = low + span;
        let close = low + span * close_frac;

        let levels = pivot_levels(&bar_at(high, low, close)).expect("finite levels");
        prop_assert!(approx_eq(levels.r2 + levels.s2, 2.0 * levels.pivot));
        prop_assert!(approx_eq(levels.r1 - levels.s1, high - low));
        prop_assert!(levels.s2 <= levels.s1 && levels.r1 <= levels.r2);
    }

    #[test]
    fn midpoint_close_makes_inner_pair_symmetric(
        low in 1.0..1_000.0_f64,
        span in 0.01..100.0_f64,
    ) {
        let high = low + span;
        let close = (high + low) / 2.0;

        let levels = pivot_levels(&bar_at(high, low, close)).expect("finite levels");
        prop_assert!(approx_eq(levels.r1 + levels.s1, 2.0 * levels.pivot));
        prop_assert!(approx_eq(levels.r2 + levels.s2, 2.0 * levels.pivot));
    }
}

#[test]
fn off_midpoint_close_shifts_inner_pair_away_from_pivot() {
    // Given: A bar closing at its low
    let levels = pivot_levels(&bar_at(1.01, 1.0, 1.0)).expect("finite levels");

    // Then: R1+S1 equals 4·pivot − (H+L), not 2·pivot
    assert!(approx_eq(levels.r1 + levels.s1, 4.0 * levels.pivot - 2.01));
    assert!(!approx_eq(levels.r1 + levels.s1, 2.0 * levels.pivot));
    assert!(approx_eq(levels.r2 + levels.s2, 2.0 * levels.pivot));
}
