//! Market data acquisition.
//!
//! The quote providers form an ordered fallback chain: each is tried in
//! sequence and the first success wins. Historical series and the sentiment
//! index are best-effort; their failures degrade the response instead of
//! failing it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Result;
use crate::sources::{BinanceClient, CoinMarketCapClient, FearGreedClient};
use crate::types::{Candle, MarketSnapshot};

/// Default size of the historical candle window.
pub const DEFAULT_CANDLE_LIMIT: usize = 200;

/// One market-data source in the fallback chain.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Fetch the current snapshot for a symbol.
    async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}

#[async_trait]
impl MarketDataProvider for CoinMarketCapClient {
    async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        self.fetch_quote(symbol).await
    }

    fn name(&self) -> &str {
        "coinmarketcap"
    }
}

#[async_trait]
impl MarketDataProvider for BinanceClient {
    async fn fetch_snapshot(&self, symbol: &str) -> Result<MarketSnapshot> {
        self.fetch_ticker(symbol).await
    }

    fn name(&self) -> &str {
        "binance"
    }
}

/// Market context fetching for the analyze pipeline.
pub struct MarketDataService {
    providers: Vec<Arc<dyn MarketDataProvider>>,
    binance: Arc<BinanceClient>,
    fear_greed: FearGreedClient,
}

impl MarketDataService {
    /// Build the provider chain from configuration.
    ///
    /// The primary provider is part of the chain only when its API key is
    /// configured; a keyless call could never succeed.
    pub fn new(config: &Config) -> Self {
        let mut providers: Vec<Arc<dyn MarketDataProvider>> = Vec::new();

        if let Some(ref key) = config.cmc_api_key {
            providers.push(Arc::new(CoinMarketCapClient::new(
                &config.cmc_api_url,
                key.clone(),
            )));
        } else {
            warn!("COINMARKETCAP_API_KEY not set; quotes come from the exchange ticker only");
        }

        let binance = Arc::new(BinanceClient::new(&config.binance_api_url));
        providers.push(binance.clone());

        Self {
            providers,
            binance,
            fear_greed: FearGreedClient::new(&config.fear_greed_api_url),
        }
    }

    /// Assemble a service from explicit parts.
    pub fn with_providers(
        providers: Vec<Arc<dyn MarketDataProvider>>,
        binance: Arc<BinanceClient>,
        fear_greed: FearGreedClient,
    ) -> Self {
        Self {
            providers,
            binance,
            fear_greed,
        }
    }

    /// Fetch a market snapshot, trying each provider in order.
    ///
    /// `None` means every provider failed; the caller surfaces that as the
    /// one client-facing market-data error.
    pub async fn fetch_snapshot(&self, symbol: &str) -> Option<MarketSnapshot> {
        for provider in &self.providers {
            match provider.fetch_snapshot(symbol).await {
                Ok(snapshot) => {
                    debug!("Market data for {} from {}", symbol, provider.name());
                    return Some(snapshot);
                }
                Err(e) => {
                    warn!("Market data provider {} failed for {}: {}", provider.name(), symbol, e);
                }
            }
        }
        None
    }

    /// Fetch the historical candle series, oldest first.
    ///
    /// Empty on any failure; an undersized series means "indicators
    /// unavailable", never a hard error.
    pub async fn fetch_history(&self, symbol: &str, interval: &str, limit: usize) -> Vec<Candle> {
        match self.binance.fetch_klines(symbol, interval, limit).await {
            Ok(candles) => candles,
            Err(e) => {
                warn!("Historical fetch failed for {}: {}", symbol, e);
                Vec::new()
            }
        }
    }

    /// Fetch the fear/greed index, absent on any failure.
    pub async fn fetch_sentiment(&self) -> Option<i64> {
        match self.fear_greed.fetch_index().await {
            Ok(value) => Some(value),
            Err(e) => {
                warn!("Fear & Greed fetch failed: {}", e);
                None
            }
        }
    }
}
