//! Tests for the indicator pipeline over realistic candle series

use seance::services::indicators::{calculate, MIN_CANDLES};
use seance::types::{Candle, IndicatorSet};

fn candle(i: usize, close: f64) -> Candle {
    Candle {
        timestamp: 1_700_000_000_000 + i as i64 * 3_600_000,
        open: close - 0.5,
        high: close + 1.0,
        low: close - 1.0,
        close,
        volume: 1_000.0 + i as f64,
    }
}

fn trending(len: usize, start: f64, step: f64) -> Vec<Candle> {
    (0..len)
        .map(|i| candle(i, start + step * i as f64))
        .collect()
}

fn oscillating(len: usize, base: f64, amplitude: f64) -> Vec<Candle> {
    (0..len)
        .map(|i| {
            let wobble = if i % 2 == 0 { amplitude } else { -amplitude };
            candle(i, base + wobble)
        })
        .collect()
}

fn all_values(set: &IndicatorSet) -> [f64; 12] {
    [
        set.rsi,
        set.macd,
        set.macd_signal,
        set.macd_histogram,
        set.sma_20,
        set.sma_50,
        set.ema_12,
        set.ema_26,
        set.bollinger_upper,
        set.bollinger_lower,
        set.support,
        set.resistance,
    ]
}

#[test]
fn test_undersized_series_yields_no_indicators() {
    assert!(calculate(&[]).is_none());
    assert!(calculate(&trending(MIN_CANDLES - 1, 100.0, 1.0)).is_none());
}

#[test]
fn test_minimum_series_yields_full_set() {
    assert!(calculate(&trending(MIN_CANDLES, 100.0, 1.0)).is_some());
}

#[test]
fn test_all_indicator_values_are_finite() {
    let series = [
        trending(80, 43_000.0, 25.0),
        trending(80, 43_000.0, -25.0),
        oscillating(80, 43_000.0, 150.0),
        trending(60, 0.07, 0.0001),
    ];

    for candles in &series {
        let set = calculate(candles).unwrap();
        for value in all_values(&set) {
            assert!(value.is_finite(), "non-finite value in {:?}", set);
        }
    }
}

#[test]
fn test_rsi_stays_within_bounds() {
    for candles in [
        trending(80, 100.0, 2.0),
        trending(80, 100.0, -1.0),
        oscillating(80, 100.0, 5.0),
    ] {
        let set = calculate(&candles).unwrap();
        assert!((0.0..=100.0).contains(&set.rsi), "rsi = {}", set.rsi);
    }
}

#[test]
fn test_uptrend_reads_strong() {
    let set = calculate(&trending(80, 100.0, 2.0)).unwrap();

    assert!(set.rsi > 50.0);
    assert!(set.macd > 0.0);
}

#[test]
fn test_downtrend_reads_weak() {
    let set = calculate(&trending(80, 500.0, -2.0)).unwrap();

    assert!(set.rsi < 50.0);
    assert!(set.macd < 0.0);
}

#[test]
fn test_bollinger_bands_bracket_the_midline() {
    let set = calculate(&oscillating(80, 43_000.0, 150.0)).unwrap();

    assert!(set.bollinger_lower < set.sma_20);
    assert!(set.sma_20 < set.bollinger_upper);
}

#[test]
fn test_support_and_resistance_bracket_the_window() {
    let candles = oscillating(80, 43_000.0, 150.0);
    let set = calculate(&candles).unwrap();

    assert!(set.support < set.resistance);
    for c in candles.iter().rev().take(50) {
        assert!(set.support <= c.low);
        assert!(set.resistance >= c.high);
    }
}

#[test]
fn test_range_uses_only_the_trailing_window() {
    // A spike outside the trailing 50 bars must not move the levels.
    let mut candles = trending(60, 1_000.0, 1.0);
    candles[2].high = 1_000_000.0;
    candles[3].low = 0.001;

    let set = calculate(&candles).unwrap();
    assert!(set.resistance < 10_000.0);
    assert!(set.support > 100.0);
}

#[test]
fn test_flat_series_collapses_the_bands() {
    let set = calculate(&trending(60, 250.0, 0.0)).unwrap();

    assert_eq!(set.sma_20, 250.0);
    assert_eq!(set.sma_50, 250.0);
    assert!((set.bollinger_upper - 250.0).abs() < 1e-9);
    assert!((set.bollinger_lower - 250.0).abs() < 1e-9);
    assert!(set.macd.abs() < 1e-9);
    assert!(set.macd_histogram.abs() < 1e-9);
}

#[test]
fn test_calculation_is_deterministic() {
    let candles = oscillating(80, 43_000.0, 150.0);

    let first = calculate(&candles).unwrap();
    let second = calculate(&candles).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_sma_is_the_trailing_average() {
    let candles = trending(60, 100.0, 1.0);
    let set = calculate(&candles).unwrap();

    // Closes run 100..159; the last 20 average to 149.5, the last 50 to 134.5.
    assert!((set.sma_20 - 149.5).abs() < 1e-9);
    assert!((set.sma_50 - 134.5).abs() < 1e-9);
}

#[test]
fn test_fast_ema_tracks_price_closer_than_slow() {
    let candles = trending(80, 100.0, 2.0);
    let set = calculate(&candles).unwrap();
    let last_close = candles.last().unwrap().close;

    assert!((last_close - set.ema_12).abs() < (last_close - set.ema_26).abs());
}
