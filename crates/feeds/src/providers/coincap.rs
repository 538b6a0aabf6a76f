use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use common::{Candle, CandleRequest, MarketDataProvider, PriceSnapshot, ProviderError, ProviderKind};

use super::{integer, malformed, number, optional_number};
use crate::http::get_text;

/// CoinCap aggregator API.
///
/// History is a list of point prices, so every candle it yields is
/// zero-range (open = high = low = close) with no volume.
pub struct CoinCapProvider {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl CoinCapProvider {
    pub const BASE_URL: &'static str = "https://api.coincap.io/v2";

    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            timeout: ProviderKind::CoinCap.default_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MarketDataProvider for CoinCapProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::CoinCap
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<PriceSnapshot, ProviderError> {
        let url = format!("{}/assets/{}", self.base_url, symbol);
        let body = get_text(&self.http, &url, &[]).await?;
        parse_asset(&body)
    }

    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>, ProviderError> {
        let end_ms = Utc::now().timestamp_millis();
        let span_ms = request.limit as i64 * request.interval.seconds() * 1000;
        let url = format!("{}/assets/{}/history", self.base_url, request.symbol);
        let body = get_text(
            &self.http,
            &url,
            &[
                ("interval", request.native_interval.to_string()),
                ("start", (end_ms - span_ms).to_string()),
                ("end", end_ms.to_string()),
            ],
        )
        .await?;
        parse_history(&body)
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

/// Parse `/assets/{id}`: `{"data": {"priceUsd": "...", "changePercent24Hr": "...", ...}}`.
pub fn parse_asset(body: &str) -> Result<PriceSnapshot, ProviderError> {
    let env: Envelope<Value> = serde_json::from_str(body).map_err(malformed)?;
    let asset = &env.data;
    let price = asset
        .get("priceUsd")
        .ok_or_else(|| ProviderError::Malformed("missing 'priceUsd'".into()))?;

    Ok(PriceSnapshot {
        price: number(price, "priceUsd")?,
        change_pct: optional_number(asset.get("changePercent24Hr"), "changePercent24Hr")?
            .unwrap_or(0.0),
        high: None,
        low: None,
        volume: optional_number(asset.get("volumeUsd24Hr"), "volumeUsd24Hr")?,
    })
}

/// Parse `/assets/{id}/history`: `{"data": [{"priceUsd": "...", "time": ms}, ...]}`.
pub fn parse_history(body: &str) -> Result<Vec<Candle>, ProviderError> {
    let env: Envelope<Vec<Value>> = serde_json::from_str(body).map_err(malformed)?;
    env.data
        .iter()
        .map(|point| {
            let price = point
                .get("priceUsd")
                .ok_or_else(|| ProviderError::Malformed("history point missing 'priceUsd'".into()))?;
            let time = point
                .get("time")
                .ok_or_else(|| ProviderError::Malformed("history point missing 'time'".into()))?;
            Ok(Candle::flat(integer(time, "time")?, number(price, "priceUsd")?, 0.0))
        })
        .collect()
}
