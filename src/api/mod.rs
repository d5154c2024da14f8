pub mod analyze;
pub mod health;
pub mod symbols;

use crate::AppState;
use axum::Router;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(symbols::router())
        .merge(analyze::router())
}
