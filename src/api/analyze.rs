use axum::{extract::State, routing::post, Json, Router};
use chrono::Utc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::services::{indicators, DEFAULT_CANDLE_LIMIT};
use crate::types::{AnalyzeRequest, AnalyzeResponse, KeyLevels, MarketSentiment, TechnicalData};
use crate::AppState;

async fn analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>> {
    run_analysis(&state, request)
        .await
        .map(Json)
        .map_err(internal_failure)
}

/// The analyze pipeline: snapshot, history, indicators, sentiment, advisory.
async fn run_analysis(state: &AppState, request: AnalyzeRequest) -> Result<AnalyzeResponse> {
    let symbol = request.symbol.to_uppercase();
    info!(
        "Analyzing {} on {} for query: {}",
        symbol, request.timeframe, request.query
    );

    let snapshot = state
        .market_data
        .fetch_snapshot(&symbol)
        .await
        .ok_or_else(|| AppError::BadRequest("Unable to fetch market data".to_string()))?;

    let candles = state
        .market_data
        .fetch_history(&symbol, &request.timeframe, DEFAULT_CANDLE_LIMIT)
        .await;
    let indicator_set = indicators::calculate(&candles);

    let fear_greed_index = state.market_data.fetch_sentiment().await;

    let advisory = state
        .advisor
        .generate(&request.query, &snapshot, indicator_set.as_ref())
        .await;

    let technical_data =
        TechnicalData::from_parts(&snapshot, indicator_set.as_ref(), fear_greed_index);
    let key_levels = KeyLevels::from_indicators(indicator_set.as_ref());
    let market_sentiment = MarketSentiment::from_change_24h(snapshot.change_24h);

    Ok(AnalyzeResponse {
        success: true,
        analysis: advisory.analysis,
        recommendation: advisory.recommendation,
        confidence: advisory.confidence,
        risk_level: advisory.risk_level,
        timeframe: advisory.horizon,
        technical_data,
        market_sentiment,
        key_levels,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Keep the no-data rejection client-facing; everything else becomes the
/// generic analysis failure.
fn internal_failure(e: AppError) -> AppError {
    match e {
        AppError::BadRequest(_) => e,
        other => AppError::Internal(format!("Analysis failed: {}", other)),
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/analyze", post(analyze))
}
