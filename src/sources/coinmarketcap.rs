use std::collections::HashMap;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, Result};
use crate::sources::body_snippet;
use crate::types::MarketSnapshot;

/// Reference currency every quote is converted to.
const CONVERT_CURRENCY: &str = "USD";
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// CoinMarketCap quote envelope: `data` maps the requested symbol to its
/// asset record.
#[derive(Debug, Deserialize)]
struct CmcQuoteResponse {
    data: HashMap<String, CmcAsset>,
}

#[derive(Debug, Deserialize)]
struct CmcAsset {
    last_updated: Option<String>,
    quote: HashMap<String, CmcQuote>,
}

#[derive(Debug, Deserialize)]
struct CmcQuote {
    price: Option<f64>,
    percent_change_24h: Option<f64>,
    volume_24h: Option<f64>,
    market_cap: Option<f64>,
}

/// CoinMarketCap REST client (primary market-data provider).
#[derive(Clone)]
pub struct CoinMarketCapClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl CoinMarketCapClient {
    /// Create a new CoinMarketCap client.
    pub fn new(base_url: &str, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("Seance/1.0")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Fetch the latest quote for one symbol.
    ///
    /// Any missing field is an error here; the caller decides whether to
    /// fall through to the next provider.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<MarketSnapshot> {
        let url = format!("{}/cryptocurrency/quotes/latest", self.base_url);

        let response = self
            .client
            .get(&url)
            .header("X-CMC_PRO_API_KEY", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("symbol", symbol), ("convert", CONVERT_CURRENCY)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(
                "CoinMarketCap API returned {}: {}",
                status,
                body_snippet(&text)
            );
            return Err(AppError::ExternalApi(format!(
                "CoinMarketCap API error: {}",
                status
            )));
        }

        let body: CmcQuoteResponse = response.json().await?;
        let asset = body
            .data
            .get(symbol)
            .ok_or_else(|| missing_field(symbol, "data"))?;
        let quote = asset
            .quote
            .get(CONVERT_CURRENCY)
            .ok_or_else(|| missing_field(symbol, "quote"))?;

        Ok(MarketSnapshot {
            price: quote.price.ok_or_else(|| missing_field(symbol, "price"))?,
            change_24h: quote
                .percent_change_24h
                .ok_or_else(|| missing_field(symbol, "percent_change_24h"))?,
            volume_24h: quote
                .volume_24h
                .ok_or_else(|| missing_field(symbol, "volume_24h"))?,
            market_cap: quote
                .market_cap
                .ok_or_else(|| missing_field(symbol, "market_cap"))?,
            last_updated: asset
                .last_updated
                .clone()
                .ok_or_else(|| missing_field(symbol, "last_updated"))?,
        })
    }
}

fn missing_field(symbol: &str, field: &str) -> AppError {
    AppError::ExternalApi(format!(
        "CoinMarketCap response for {} missing {}",
        symbol, field
    ))
}
