pub mod advisor;
pub mod indicators;
pub mod market_data;

pub use advisor::AdvisoryService;
pub use market_data::{MarketDataProvider, MarketDataService, DEFAULT_CANDLE_LIMIT};
