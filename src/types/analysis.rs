use serde::{Deserialize, Serialize};

use crate::types::{MarketSentiment, MarketSnapshot};

/// Technical indicators derived from one historical series.
///
/// Either every field is present or the whole set is unavailable; callers
/// hold an `Option<IndicatorSet>` and must not fabricate partial sets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
    pub support: f64,
    pub resistance: f64,
}

/// Trade recommendation label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Recommendation {
    Buy,
    Sell,
    Hold,
}

impl Recommendation {
    /// Get display label for this recommendation.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Sell => "SELL",
            Self::Hold => "HOLD",
        }
    }
}

/// Risk assessment attached to an advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Get display label for this risk level.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

/// A complete trade advisory, from either the model path or the
/// deterministic fallback. Immutable once produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisory {
    /// Free-form analysis text shown to the user.
    pub analysis: String,
    pub recommendation: Recommendation,
    /// Always within [0, 100].
    pub confidence: u8,
    pub risk_level: RiskLevel,
    /// Suggested holding horizon, a fixed per-path placeholder.
    pub horizon: String,
}

/// Request body for `POST /api/analyze`.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    /// Natural-language question from the client.
    pub query: String,
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
}

fn default_symbol() -> String {
    "BTC".to_string()
}

fn default_timeframe() -> String {
    "1h".to_string()
}

/// Flattened market + indicator block of the analyze response.
///
/// Indicator fields render as zero when the set is unavailable, except RSI
/// which renders as its neutral midpoint 50.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicalData {
    pub price: f64,
    pub change_24h: f64,
    /// Same value as `change_24h`; kept for client compatibility.
    pub change_percent_24h: f64,
    pub volume_24h: f64,
    pub market_cap: f64,
    pub rsi: f64,
    pub macd: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    pub bollinger_upper: f64,
    pub bollinger_lower: f64,
    pub support_level: f64,
    pub resistance_level: f64,
    pub fear_greed_index: Option<i64>,
}

impl TechnicalData {
    /// Flatten a snapshot and an optional indicator set into the wire shape.
    pub fn from_parts(
        snapshot: &MarketSnapshot,
        indicators: Option<&IndicatorSet>,
        fear_greed_index: Option<i64>,
    ) -> Self {
        Self {
            price: snapshot.price,
            change_24h: snapshot.change_24h,
            change_percent_24h: snapshot.change_24h,
            volume_24h: snapshot.volume_24h,
            market_cap: snapshot.market_cap,
            rsi: indicators.map_or(50.0, |i| i.rsi),
            macd: indicators.map_or(0.0, |i| i.macd),
            macd_signal: indicators.map_or(0.0, |i| i.macd_signal),
            macd_histogram: indicators.map_or(0.0, |i| i.macd_histogram),
            sma_20: indicators.map_or(0.0, |i| i.sma_20),
            sma_50: indicators.map_or(0.0, |i| i.sma_50),
            ema_12: indicators.map_or(0.0, |i| i.ema_12),
            ema_26: indicators.map_or(0.0, |i| i.ema_26),
            bollinger_upper: indicators.map_or(0.0, |i| i.bollinger_upper),
            bollinger_lower: indicators.map_or(0.0, |i| i.bollinger_lower),
            support_level: indicators.map_or(0.0, |i| i.support),
            resistance_level: indicators.map_or(0.0, |i| i.resistance),
            fear_greed_index,
        }
    }
}

/// Price levels a client may chart alongside the advisory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyLevels {
    pub support: f64,
    pub resistance: f64,
    pub sma_20: f64,
    pub sma_50: f64,
}

impl KeyLevels {
    /// Pull the chartable levels out of an optional indicator set.
    pub fn from_indicators(indicators: Option<&IndicatorSet>) -> Self {
        Self {
            support: indicators.map_or(0.0, |i| i.support),
            resistance: indicators.map_or(0.0, |i| i.resistance),
            sma_20: indicators.map_or(0.0, |i| i.sma_20),
            sma_50: indicators.map_or(0.0, |i| i.sma_50),
        }
    }
}

/// Response body for `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub analysis: String,
    pub recommendation: Recommendation,
    pub confidence: u8,
    pub risk_level: RiskLevel,
    /// The advisory horizon text, not the candle interval.
    pub timeframe: String,
    pub technical_data: TechnicalData,
    pub market_sentiment: MarketSentiment,
    pub key_levels: KeyLevels,
    /// ISO-8601 UTC time the response was assembled.
    pub timestamp: String,
}
