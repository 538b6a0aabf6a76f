use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Candle, Interval, ProviderError, ProviderKind};

/// A candle request already translated into one provider's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleRequest {
    /// Provider-native symbol or asset id (e.g. `BTCUSDT`, `bitcoin`, `BTC-USD`).
    pub symbol: String,
    /// Interval the provider will deliver.
    pub interval: Interval,
    /// Provider-native interval token (e.g. `1h`, `h1`, `60m`).
    pub native_interval: &'static str,
    pub limit: usize,
}

/// Raw price snapshot as returned by one provider, before the resolver stamps
/// symbol, source and fetch time on it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    pub price: f64,
    pub change_pct: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
}

/// Abstraction over one upstream market data source.
///
/// Implementations only talk to their own provider and map its payload into
/// the canonical shapes. Ordering, timeouts and fallback belong to the
/// resolver in `crates/feeds`.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Budget for a single attempt against this provider.
    fn timeout(&self) -> Duration {
        self.kind().default_timeout()
    }

    /// Fetch the current price for a provider-native symbol.
    async fn fetch_quote(&self, symbol: &str) -> Result<PriceSnapshot, ProviderError>;

    /// Fetch raw candles. Output may be unsorted or contain millisecond
    /// timestamps; the resolver normalizes it.
    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>, ProviderError>;
}
