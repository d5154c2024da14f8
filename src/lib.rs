//! Seance - Cryptocurrency market analysis server with model-backed trade advisories

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

use std::sync::Arc;

use config::Config;
use services::{AdvisoryService, MarketDataService};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub market_data: Arc<MarketDataService>,
    pub advisor: Arc<AdvisoryService>,
}

impl AppState {
    /// Wire up every service from configuration.
    pub fn new(config: Config) -> Self {
        let market_data = Arc::new(MarketDataService::new(&config));
        let advisor = Arc::new(AdvisoryService::new(&config));

        Self {
            config: Arc::new(config),
            market_data,
            advisor,
        }
    }
}

// Re-export commonly used types
pub use error::{AppError, Result};
pub use types::*;
