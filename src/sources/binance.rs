use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::sources::body_snippet;
use crate::types::{Candle, MarketSnapshot};

/// Quote asset every traded pair is denominated in.
const QUOTE_ASSET: &str = "USDT";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Binance 24hr ticker response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BinanceTicker {
    symbol: String,
    last_price: String,
    price_change_percent: String,
    volume: String,
}

/// One kline row. Binance sends a fixed-width JSON array; serde fills the
/// fields positionally.
#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct BinanceKline {
    open_time: i64,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
    close_time: i64,
    quote_asset_volume: String,
    number_of_trades: i64,
    taker_buy_base_asset_volume: String,
    taker_buy_quote_asset_volume: String,
    ignore: String,
}

impl BinanceKline {
    /// Convert to the normalized candle shape, dropping the fields outside
    /// the data model.
    fn into_candle(self) -> Option<Candle> {
        Some(Candle {
            timestamp: self.open_time,
            open: self.open.parse().ok()?,
            high: self.high.parse().ok()?,
            low: self.low.parse().ok()?,
            close: self.close.parse().ok()?,
            volume: self.volume.parse().ok()?,
        })
    }
}

/// Binance REST client (fallback quote provider and kline source).
#[derive(Clone)]
pub struct BinanceClient {
    client: Client,
    base_url: String,
}

impl BinanceClient {
    /// Create a new Binance client.
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("Seance/1.0")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Trading pair for a base symbol.
    fn pair(symbol: &str) -> String {
        format!("{}{}", symbol, QUOTE_ASSET)
    }

    /// Fetch the 24hr ticker for one symbol as a market snapshot.
    ///
    /// Binance reports no market capitalization; that field is zero by
    /// contract. `last_updated` is the fetch time.
    pub async fn fetch_ticker(&self, symbol: &str) -> Result<MarketSnapshot> {
        let url = format!("{}/ticker/24hr", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("symbol", Self::pair(symbol))])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "Binance ticker API returned {}: {}",
                status,
                body_snippet(&text)
            );
            return Err(AppError::ExternalApi(format!(
                "Binance API error: {}",
                status
            )));
        }

        let ticker: BinanceTicker = response.json().await?;
        debug!("Binance ticker: {} = {}", ticker.symbol, ticker.last_price);

        let parse = |value: &str, field: &str| -> Result<f64> {
            value.parse().map_err(|_| {
                AppError::ExternalApi(format!("Binance ticker has malformed {}", field))
            })
        };

        Ok(MarketSnapshot {
            price: parse(&ticker.last_price, "lastPrice")?,
            change_24h: parse(&ticker.price_change_percent, "priceChangePercent")?,
            volume_24h: parse(&ticker.volume, "volume")?,
            market_cap: 0.0,
            last_updated: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Fetch the most recent `limit` klines for a symbol and interval,
    /// oldest first.
    pub async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>> {
        let url = format!("{}/klines", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("symbol", Self::pair(symbol)),
                ("interval", interval.to_string()),
                ("limit", limit.to_string()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "Binance klines API returned {}: {}",
                status,
                body_snippet(&text)
            );
            return Err(AppError::ExternalApi(format!(
                "Binance API error: {}",
                status
            )));
        }

        let rows: Vec<BinanceKline> = response.json().await?;
        let candles: Option<Vec<Candle>> =
            rows.into_iter().map(BinanceKline::into_candle).collect();

        candles.ok_or_else(|| {
            AppError::ExternalApi("Binance returned a malformed kline row".to_string())
        })
    }
}
