use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

/// Symbols the analyze endpoint is known to work well with.
const SUPPORTED_SYMBOLS: [&str; 15] = [
    "BTC", "ETH", "BNB", "ADA", "SOL", "XRP", "DOT", "DOGE", "AVAX", "SHIB", "MATIC", "LTC",
    "UNI", "LINK", "ATOM",
];

#[derive(Serialize)]
struct SupportedSymbolsResponse {
    symbols: Vec<&'static str>,
}

async fn supported_symbols() -> Json<SupportedSymbolsResponse> {
    Json(SupportedSymbolsResponse {
        symbols: SUPPORTED_SYMBOLS.to_vec(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/supported-symbols", get(supported_symbols))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_supported_symbols_list() {
        let Json(response) = supported_symbols().await;

        assert_eq!(response.symbols.len(), 15);
        assert_eq!(response.symbols[0], "BTC");
        assert_eq!(response.symbols[14], "ATOM");
        assert!(response.symbols.contains(&"SOL"));
    }

    #[test]
    fn test_supported_symbols_serialization() {
        let json = serde_json::to_string(&SupportedSymbolsResponse {
            symbols: vec!["BTC", "ETH"],
        })
        .unwrap();

        assert_eq!(json, r#"{"symbols":["BTC","ETH"]}"#);
    }
}
