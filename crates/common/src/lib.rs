pub mod config;
pub mod error;
pub mod provider;
pub mod types;

pub use config::Config;
pub use error::{Error, ProviderError, Result, SourceAttempt};
pub use provider::{CandleRequest, MarketDataProvider, PriceSnapshot};
pub use types::*;
