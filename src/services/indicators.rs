//! Technical indicator calculation.
//!
//! A pure function from a candle series to the derived indicator set. The
//! set is all-or-nothing: with fewer than [`MIN_CANDLES`] bars (or any
//! degenerate result) the caller gets `None`, never a partial set.

use crate::types::{Candle, IndicatorSet};

/// Minimum history length for a meaningful indicator set.
///
/// SMA-50 and the support/resistance window both span 50 bars; computing
/// them on fewer points would be undefined, so the whole set is withheld.
pub const MIN_CANDLES: usize = 50;

const RSI_PERIOD: usize = 14;
const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const BOLLINGER_PERIOD: usize = 20;
const BOLLINGER_STD_DEV: f64 = 2.0;
const RANGE_WINDOW: usize = 50;

/// Derive the full indicator set from a candle series (oldest first).
pub fn calculate(candles: &[Candle]) -> Option<IndicatorSet> {
    if candles.len() < MIN_CANDLES {
        return None;
    }

    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();

    let rsi = calculate_rsi(&closes, RSI_PERIOD)?;
    let (macd, macd_signal, macd_histogram) = calculate_macd(&closes)?;
    let sma_20 = calculate_sma(&closes, 20)?;
    let sma_50 = calculate_sma(&closes, 50)?;
    let ema_12 = calculate_ema(&closes, MACD_FAST).last().copied()?;
    let ema_26 = calculate_ema(&closes, MACD_SLOW).last().copied()?;
    let (bollinger_upper, bollinger_lower) = calculate_bollinger(&closes)?;
    let (support, resistance) = calculate_range(candles);

    let set = IndicatorSet {
        rsi,
        macd,
        macd_signal,
        macd_histogram,
        sma_20,
        sma_50,
        ema_12,
        ema_26,
        bollinger_upper,
        bollinger_lower,
        support,
        resistance,
    };

    let values = [
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
    ];
    if values.iter().all(|v| v.is_finite()) {
        Some(set)
    } else {
        None
    }
}

/// RSI over closes using Wilder's smoothing of average gain/loss.
fn calculate_rsi(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period + 1 {
        return None;
    }

    let mut gains = Vec::new();
    let mut losses = Vec::new();

    for i in 1..closes.len() {
        let change = closes[i] - closes[i - 1];
        if change > 0.0 {
            gains.push(change);
            losses.push(0.0);
        } else {
            gains.push(0.0);
            losses.push(-change);
        }
    }

    // Initial averages, then smoothed for the remainder
    let mut avg_gain: f64 = gains.iter().take(period).sum::<f64>() / period as f64;
    let mut avg_loss: f64 = losses.iter().take(period).sum::<f64>() / period as f64;

    for i in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[i]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[i]) / period as f64;
    }

    if avg_loss == 0.0 {
        return Some(100.0);
    }

    let rs = avg_gain / avg_loss;
    Some(100.0 - (100.0 / (1.0 + rs)))
}

/// EMA series for the given period, seeded with the SMA of the first window.
fn calculate_ema(values: &[f64], period: usize) -> Vec<f64> {
    if values.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut ema = Vec::with_capacity(values.len());

    // First EMA is SMA
    let sma: f64 = values.iter().take(period).sum::<f64>() / period as f64;
    ema.push(sma);

    for i in period..values.len() {
        let prev = *ema.last().unwrap_or(&sma);
        ema.push((values[i] - prev) * multiplier + prev);
    }

    ema
}

/// MACD line, signal line, and histogram (latest values).
fn calculate_macd(closes: &[f64]) -> Option<(f64, f64, f64)> {
    if closes.len() < MACD_SLOW + MACD_SIGNAL {
        return None;
    }

    let fast_ema = calculate_ema(closes, MACD_FAST);
    let slow_ema = calculate_ema(closes, MACD_SLOW);

    if fast_ema.is_empty() || slow_ema.is_empty() {
        return None;
    }

    // Align the two series; the fast EMA starts earlier
    let offset = MACD_SLOW - MACD_FAST;
    let macd_line: Vec<f64> = fast_ema
        .iter()
        .skip(offset)
        .zip(slow_ema.iter())
        .map(|(f, s)| f - s)
        .collect();

    if macd_line.len() < MACD_SIGNAL {
        return None;
    }

    let signal_line = calculate_ema(&macd_line, MACD_SIGNAL);

    let macd = *macd_line.last()?;
    let signal = *signal_line.last()?;
    let histogram = macd - signal;

    Some((macd, signal, histogram))
}

/// Simple moving average over the trailing `period` closes.
fn calculate_sma(closes: &[f64], period: usize) -> Option<f64> {
    if closes.len() < period {
        return None;
    }

    let sum: f64 = closes.iter().rev().take(period).sum();
    Some(sum / period as f64)
}

/// Upper and lower Bollinger Bands over the trailing window.
fn calculate_bollinger(closes: &[f64]) -> Option<(f64, f64)> {
    if closes.len() < BOLLINGER_PERIOD {
        return None;
    }

    let window: Vec<f64> = closes.iter().rev().take(BOLLINGER_PERIOD).copied().collect();
    let middle = window.iter().sum::<f64>() / BOLLINGER_PERIOD as f64;

    // Population standard deviation over the same window
    let variance =
        window.iter().map(|v| (v - middle).powi(2)).sum::<f64>() / window.len() as f64;
    let std_dev = variance.sqrt();

    let upper = middle + BOLLINGER_STD_DEV * std_dev;
    let lower = middle - BOLLINGER_STD_DEV * std_dev;
    Some((upper, lower))
}

/// Naive support/resistance: min low and max high over the trailing window.
fn calculate_range(candles: &[Candle]) -> (f64, f64) {
    let window = candles.iter().rev().take(RANGE_WINDOW);
    let support = window
        .clone()
        .map(|c| c.low)
        .fold(f64::INFINITY, f64::min);
    let resistance = window.map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
    (support, resistance)
}
