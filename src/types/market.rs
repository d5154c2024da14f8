use serde::{Deserialize, Serialize};

/// Normalized market quote for a single asset.
///
/// Produced fresh for every request from whichever provider answered first;
/// never cached or persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub price: f64,
    /// 24-hour price change, percent.
    pub change_24h: f64,
    /// 24-hour traded volume.
    pub volume_24h: f64,
    /// Zero when the answering provider does not report it (exchange ticker).
    pub market_cap: f64,
    /// Provider-reported update time, or the fetch time when the provider
    /// has none.
    pub last_updated: String,
}

/// One OHLCV bucket of the historical series.
///
/// Sequences are ordered oldest to newest, capped at the requested window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Bucket open time, milliseconds since epoch.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Coarse market mood derived from the 24-hour change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarketSentiment {
    Bullish,
    Bearish,
    Neutral,
}

impl MarketSentiment {
    /// Classify a 24-hour percent change.
    pub fn from_change_24h(change: f64) -> Self {
        if change > 3.0 {
            Self::Bullish
        } else if change < -3.0 {
            Self::Bearish
        } else {
            Self::Neutral
        }
    }

    /// Get display label for this sentiment.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Bullish => "Bullish",
            Self::Bearish => "Bearish",
            Self::Neutral => "Neutral",
        }
    }
}
