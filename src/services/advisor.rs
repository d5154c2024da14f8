//! Trade advisory generation.
//!
//! The model path asks Gemini for a schema-constrained JSON reply and maps
//! it onto [`Advisory`]. A malformed reply is salvaged with a keyword scan
//! over the raw text, and any call failure falls back to a deterministic
//! advisory derived from RSI and the 24h change. Advisory generation itself
//! never fails a request.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::sources::GeminiClient;
use crate::types::{Advisory, IndicatorSet, MarketSnapshot, Recommendation, RiskLevel};

/// Horizon attached to model-backed advisories.
const AI_HORIZON: &str = "1-7 days";

/// Horizon attached to deterministic fallback advisories.
const FALLBACK_HORIZON: &str = "1-3 days";

/// Confidence used when the reply names no percentage.
const DEFAULT_CONFIDENCE: u8 = 75;

/// Ordered recommendation keyword rules; the first matching row wins.
const RECOMMENDATION_RULES: &[(Recommendation, &[&str])] = &[
    (Recommendation::Buy, &["buy", "buying", "accumulate"]),
    (Recommendation::Sell, &["sell", "selling", "take profit"]),
    (Recommendation::Hold, &["hold", "wait", "watch"]),
];

/// Ordered risk keyword rules; the first matching row wins.
const RISK_RULES: &[(RiskLevel, &[&str])] = &[
    (RiskLevel::High, &["high risk", "risky", "volatile"]),
    (RiskLevel::Low, &["low risk", "safe", "stable"]),
];

/// Reply shape requested from the model via the response schema.
#[derive(Debug, Deserialize)]
struct StructuredAdvice {
    analysis: String,
    recommendation: Recommendation,
    confidence: i64,
    risk_level: RiskLevel,
}

/// Advisory generation with graceful degradation.
pub struct AdvisoryService {
    gemini: Option<GeminiClient>,
}

impl AdvisoryService {
    /// Build the service; without a Gemini key every advisory is the
    /// deterministic fallback.
    pub fn new(config: &Config) -> Self {
        let gemini = match config.gemini_api_key {
            Some(ref key) => Some(GeminiClient::new(
                &config.gemini_api_url,
                key.clone(),
                config.gemini_model.clone(),
            )),
            None => {
                warn!("GEMINI_API_KEY not set; advisories use the deterministic fallback");
                None
            }
        };
        Self { gemini }
    }

    /// Produce an advisory for the given market context.
    pub async fn generate(
        &self,
        query: &str,
        snapshot: &MarketSnapshot,
        indicators: Option<&IndicatorSet>,
    ) -> Advisory {
        let gemini = match self.gemini {
            Some(ref client) => client,
            None => return fallback_advisory(snapshot, indicators),
        };

        let prompt = build_prompt(query, snapshot, indicators);
        let schema = response_schema();

        match gemini.generate(&prompt, Some(&schema)).await {
            Ok(text) => {
                debug!("Gemini returned {} chars", text.len());
                extract_advisory(&text)
            }
            Err(e) => {
                warn!("Advisory generation failed: {}; using deterministic fallback", e);
                fallback_advisory(snapshot, indicators)
            }
        }
    }
}

/// Render the analysis prompt with the market context inlined.
pub fn build_prompt(
    query: &str,
    snapshot: &MarketSnapshot,
    indicators: Option<&IndicatorSet>,
) -> String {
    let rsi = indicators.map_or(0.0, |i| i.rsi);
    let macd = indicators.map_or(0.0, |i| i.macd);
    let macd_signal = indicators.map_or(0.0, |i| i.macd_signal);
    let sma_20 = indicators.map_or(0.0, |i| i.sma_20);
    let sma_50 = indicators.map_or(0.0, |i| i.sma_50);
    let support = indicators.map_or(0.0, |i| i.support);
    let resistance = indicators.map_or(0.0, |i| i.resistance);

    format!(
        "You are a professional cryptocurrency market analyst.\n\n\
         The user asks: \"{}\"\n\n\
         Current market data:\n\
         - Price: ${:.2}\n\
         - 24h change: {:.2}%\n\
         - 24h volume: ${:.0}\n\
         - Market cap: ${:.0}\n\n\
         Technical indicators:\n\
         - RSI: {:.1}\n\
         - MACD: {:.4}\n\
         - MACD signal: {:.4}\n\
         - SMA 20: ${:.2}\n\
         - SMA 50: ${:.2}\n\
         - Support: ${:.2}\n\
         - Resistance: ${:.2}\n\n\
         Analyze this data and give professional trading advice. Cover:\n\
         1. A detailed read of the current situation\n\
         2. A concrete recommendation (buy/sell/hold)\n\
         3. A confidence level in percent (0-100)\n\
         4. A risk assessment (low/medium/high)\n\n\
         Be specific and professional.",
        query,
        snapshot.price,
        snapshot.change_24h,
        snapshot.volume_24h,
        snapshot.market_cap,
        rsi,
        macd,
        macd_signal,
        sma_20,
        sma_50,
        support,
        resistance,
    )
}

/// Response schema sent with the generation request.
fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "analysis": {"type": "STRING"},
            "recommendation": {"type": "STRING", "enum": ["BUY", "SELL", "HOLD"]},
            "confidence": {"type": "INTEGER"},
            "risk_level": {"type": "STRING", "enum": ["low", "medium", "high"]}
        },
        "required": ["analysis", "recommendation", "confidence", "risk_level"]
    })
}

/// Map a model reply onto an advisory.
///
/// The schema-constrained JSON shape is tried first. Anything else goes
/// through the keyword scan so a prose reply still yields a usable result.
pub fn extract_advisory(text: &str) -> Advisory {
    if let Ok(advice) = serde_json::from_str::<StructuredAdvice>(text) {
        return Advisory {
            analysis: advice.analysis,
            recommendation: advice.recommendation,
            confidence: advice.confidence.clamp(0, 100) as u8,
            risk_level: advice.risk_level,
            horizon: AI_HORIZON.to_string(),
        };
    }
    scan_advisory(text)
}

/// Keyword scan over a prose reply.
fn scan_advisory(text: &str) -> Advisory {
    let lower = text.to_lowercase();

    let recommendation = RECOMMENDATION_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(recommendation, _)| *recommendation)
        .unwrap_or(Recommendation::Hold);

    let risk_level = RISK_RULES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(risk, _)| *risk)
        .unwrap_or(RiskLevel::Medium);

    Advisory {
        analysis: text.to_string(),
        recommendation,
        confidence: parse_confidence(text),
        risk_level,
        horizon: AI_HORIZON.to_string(),
    }
}

/// Pull the first "NN%" out of a reply, clamped to 0-100.
fn parse_confidence(text: &str) -> u8 {
    confidence_pattern()
        .captures(text)
        .and_then(|captures| captures.get(1))
        .and_then(|m| m.as_str().parse::<i64>().ok())
        .map(|value| value.clamp(0, 100) as u8)
        .unwrap_or(DEFAULT_CONFIDENCE)
}

fn confidence_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)%").expect("confidence pattern is valid"))
}

/// Deterministic advisory from RSI and the 24h change.
///
/// Overbought (RSI above 70) sells, oversold (below 30) buys, anything else
/// holds with risk keyed to how far the day moved. Confidence shrinks with
/// volatility and stays inside 60-90.
pub fn fallback_advisory(snapshot: &MarketSnapshot, indicators: Option<&IndicatorSet>) -> Advisory {
    let change_24h = snapshot.change_24h;
    let rsi = indicators.map_or(50.0, |i| i.rsi);

    let (recommendation, risk_level, analysis) = if rsi > 70.0 {
        (
            Recommendation::Sell,
            RiskLevel::High,
            format!(
                "Technical analysis shows overbought conditions (RSI: {:.1}). Taking profit is recommended.",
                rsi
            ),
        )
    } else if rsi < 30.0 {
        (
            Recommendation::Buy,
            RiskLevel::Medium,
            format!(
                "Technical analysis shows oversold conditions (RSI: {:.1}). An upward correction is possible.",
                rsi
            ),
        )
    } else {
        let risk = if change_24h.abs() < 2.0 {
            RiskLevel::Low
        } else {
            RiskLevel::Medium
        };
        (
            Recommendation::Hold,
            risk,
            format!(
                "The market is in a neutral zone. RSI: {:.1}, 24h change: {:.2}%.",
                rsi, change_24h
            ),
        )
    };

    let confidence = ((80.0 - change_24h.abs() * 2.0) as i64).clamp(60, 90) as u8;

    Advisory {
        analysis,
        recommendation,
        confidence,
        risk_level,
        horizon: FALLBACK_HORIZON.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(price: f64, change_24h: f64) -> MarketSnapshot {
        MarketSnapshot {
            price,
            change_24h,
            volume_24h: 25_000_000_000.0,
            market_cap: 850_000_000_000.0,
            last_updated: "2024-01-15T10:30:00Z".to_string(),
        }
    }

    fn indicators_with_rsi(rsi: f64) -> IndicatorSet {
        IndicatorSet {
            rsi,
            macd: 120.5,
            macd_signal: 98.2,
            macd_histogram: 22.3,
            sma_20: 43250.0,
            sma_50: 42100.0,
            ema_12: 43400.0,
            ema_26: 42900.0,
            bollinger_upper: 44800.0,
            bollinger_lower: 41700.0,
            support: 41000.0,
            resistance: 45500.0,
        }
    }

    // ====== Prompt Tests ======

    #[test]
    fn test_prompt_embeds_market_and_indicator_values() {
        let ind = indicators_with_rsi(65.4);
        let prompt = build_prompt("Should I buy BTC?", &snapshot(43521.5, 2.34), Some(&ind));

        assert!(prompt.contains("Should I buy BTC?"));
        assert!(prompt.contains("$43521.50"));
        assert!(prompt.contains("2.34%"));
        assert!(prompt.contains("RSI: 65.4"));
        assert!(prompt.contains("MACD: 120.5000"));
        assert!(prompt.contains("Support: $41000.00"));
    }

    #[test]
    fn test_prompt_zeroes_every_indicator_without_a_set() {
        let prompt = build_prompt("What about DOGE?", &snapshot(0.08, -1.2), None);

        assert!(prompt.contains("RSI: 0.0"));
        assert!(prompt.contains("MACD: 0.0000"));
        assert!(prompt.contains("MACD signal: 0.0000"));
        assert!(prompt.contains("SMA 20: $0.00"));
    }

    // ====== Extraction Tests ======

    #[test]
    fn test_extract_structured_reply() {
        let reply = r#"{
            "analysis": "Momentum is fading near resistance.",
            "recommendation": "SELL",
            "confidence": 82,
            "risk_level": "high"
        }"#;

        let advisory = extract_advisory(reply);
        assert_eq!(advisory.recommendation, Recommendation::Sell);
        assert_eq!(advisory.confidence, 82);
        assert_eq!(advisory.risk_level, RiskLevel::High);
        assert_eq!(advisory.analysis, "Momentum is fading near resistance.");
        assert_eq!(advisory.horizon, "1-7 days");
    }

    #[test]
    fn test_extract_clamps_structured_confidence() {
        let reply = r#"{"analysis": "x", "recommendation": "HOLD", "confidence": 250, "risk_level": "low"}"#;
        assert_eq!(extract_advisory(reply).confidence, 100);
    }

    #[test]
    fn test_extract_scans_prose_reply() {
        let reply = "Strong setup, I would buy here. Confidence around 85%. This is a risky entry though.";
        let advisory = extract_advisory(reply);

        assert_eq!(advisory.recommendation, Recommendation::Buy);
        assert_eq!(advisory.confidence, 85);
        assert_eq!(advisory.risk_level, RiskLevel::High);
        assert_eq!(advisory.analysis, reply);
    }

    #[test]
    fn test_scan_buy_outranks_sell() {
        let advisory = extract_advisory("You could sell later, but buying now makes sense.");
        assert_eq!(advisory.recommendation, Recommendation::Buy);
    }

    #[test]
    fn test_scan_defaults() {
        let advisory = extract_advisory("Nothing actionable in this market.");
        assert_eq!(advisory.recommendation, Recommendation::Hold);
        assert_eq!(advisory.risk_level, RiskLevel::Medium);
        assert_eq!(advisory.confidence, 75);
    }

    #[test]
    fn test_scan_clamps_oversized_percentage() {
        assert_eq!(extract_advisory("wait for confirmation, 400% sure").confidence, 100);
    }

    // ====== Fallback Tests ======

    #[test]
    fn test_fallback_overbought_sells() {
        let ind = indicators_with_rsi(75.0);
        let advisory = fallback_advisory(&snapshot(43000.0, 1.0), Some(&ind));

        assert_eq!(advisory.recommendation, Recommendation::Sell);
        assert_eq!(advisory.risk_level, RiskLevel::High);
        assert!(advisory.analysis.contains("overbought"));
        assert!(advisory.analysis.contains("75.0"));
        assert_eq!(advisory.horizon, "1-3 days");
    }

    #[test]
    fn test_fallback_oversold_buys() {
        let ind = indicators_with_rsi(20.0);
        let advisory = fallback_advisory(&snapshot(43000.0, 1.0), Some(&ind));

        assert_eq!(advisory.recommendation, Recommendation::Buy);
        assert_eq!(advisory.risk_level, RiskLevel::Medium);
        assert!(advisory.analysis.contains("oversold"));
    }

    #[test]
    fn test_fallback_neutral_holds() {
        let ind = indicators_with_rsi(50.0);

        let quiet = fallback_advisory(&snapshot(43000.0, 1.5), Some(&ind));
        assert_eq!(quiet.recommendation, Recommendation::Hold);
        assert_eq!(quiet.risk_level, RiskLevel::Low);

        let moving = fallback_advisory(&snapshot(43000.0, -4.0), Some(&ind));
        assert_eq!(moving.recommendation, Recommendation::Hold);
        assert_eq!(moving.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_fallback_confidence_formula() {
        let ind = indicators_with_rsi(50.0);

        // 80 - 0 = 80
        assert_eq!(fallback_advisory(&snapshot(1.0, 0.0), Some(&ind)).confidence, 80);
        // 80 - 2 * 8.7 = 62.6, truncated to 62
        assert_eq!(fallback_advisory(&snapshot(1.0, 8.7), Some(&ind)).confidence, 62);
        // 80 - 2 * 50 clamps up to 60
        assert_eq!(fallback_advisory(&snapshot(1.0, 50.0), Some(&ind)).confidence, 60);
        // sign of the move does not matter
        assert_eq!(fallback_advisory(&snapshot(1.0, -8.7), Some(&ind)).confidence, 62);
    }

    #[test]
    fn test_fallback_without_indicators_is_neutral() {
        let advisory = fallback_advisory(&snapshot(43000.0, 0.5), None);

        assert_eq!(advisory.recommendation, Recommendation::Hold);
        assert_eq!(advisory.risk_level, RiskLevel::Low);
        assert!(advisory.analysis.contains("RSI: 50.0"));
    }
}
