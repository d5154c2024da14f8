use std::env;

/// Application configuration.
///
/// Read from the environment exactly once at startup and injected into the
/// fetcher components through shared state; nothing reads `env::var` after
/// this point.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// CoinMarketCap API key (primary market-data provider; the provider is
    /// skipped entirely when absent).
    pub cmc_api_key: Option<String>,
    /// Gemini API key (advisory generation; absence forces the deterministic
    /// fallback path).
    pub gemini_api_key: Option<String>,
    /// CoinMarketCap API base URL.
    pub cmc_api_url: String,
    /// Binance API base URL (24hr ticker + klines).
    pub binance_api_url: String,
    /// Fear & Greed index API base URL.
    pub fear_greed_api_url: String,
    /// Gemini API base URL.
    pub gemini_api_url: String,
    /// Gemini model name.
    pub gemini_model: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8000);

        Self {
            host,
            port,
            cmc_api_key: env::var("COINMARKETCAP_API_KEY").ok(),
            gemini_api_key: env::var("GEMINI_API_KEY").ok(),
            cmc_api_url: env::var("COINMARKETCAP_API_URL")
                .unwrap_or_else(|_| "https://pro-api.coinmarketcap.com/v1".to_string()),
            binance_api_url: env::var("BINANCE_API_URL")
                .unwrap_or_else(|_| "https://api.binance.com/api/v3".to_string()),
            fear_greed_api_url: env::var("FEAR_GREED_API_URL")
                .unwrap_or_else(|_| "https://api.alternative.me".to_string()),
            gemini_api_url: env::var("GEMINI_API_URL")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com/v1beta".to_string()),
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-pro".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
