use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::error::{AppError, Result};

const REQUEST_TIMEOUT_SECS: u64 = 10;

/// alternative.me Fear & Greed envelope:
/// `{ "data": [{ "value": "25", "value_classification": "Extreme Fear", ... }] }`.
/// The index value arrives as a string.
#[derive(Debug, Deserialize)]
struct FearGreedResponse {
    data: Vec<FearGreedEntry>,
}

#[derive(Debug, Deserialize)]
struct FearGreedEntry {
    value: String,
}

/// alternative.me Fear & Greed index client.
#[derive(Clone)]
pub struct FearGreedClient {
    client: Client,
    base_url: String,
}

impl FearGreedClient {
    /// Create a new Fear & Greed client.
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

    /// Fetch the current index value.
    pub async fn fetch_index(&self) -> Result<i64> {
        let url = format!("{}/fng/", self.base_url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Fear & Greed API returned {}", status);
            return Err(AppError::ExternalApi(format!(
                "Fear & Greed API error: {}",
                status
            )));
        }

        let body: FearGreedResponse = response.json().await?;
        let entry = body.data.first().ok_or_else(|| {
            AppError::ExternalApi("Fear & Greed response has no data".to_string())
        })?;

        entry.value.parse().map_err(|_| {
            AppError::ExternalApi(format!("Fear & Greed value is not an integer: {}", entry.value))
        })
    }
}
