use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use common::{Candle, CandleRequest, MarketDataProvider, PriceSnapshot, ProviderError, ProviderKind};

use super::{integer, malformed, number};
use crate::http::get_text;

/// Public market data REST client for Binance and its regional mirror.
///
/// Both hosts expose identical `/api/v3` paths and payloads, so one adapter
/// serves both; only the base URL and reported provider differ.
pub struct BinanceProvider {
    kind: ProviderKind,
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl BinanceProvider {
    pub const BASE_URL: &'static str = "https://api.binance.com";
    pub const US_BASE_URL: &'static str = "https://api.binance.us";

    /// Binance's hard cap on klines per request.
    const MAX_KLINES: usize = 1000;

    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self::with_kind(ProviderKind::Binance, http, base_url)
    }

    pub fn us(http: Client, base_url: impl Into<String>) -> Self {
        Self::with_kind(ProviderKind::BinanceUs, http, base_url)
    }

    fn with_kind(kind: ProviderKind, http: Client, base_url: impl Into<String>) -> Self {
        Self {
            kind,
            base_url: base_url.into(),
            http,
            timeout: kind.default_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MarketDataProvider for BinanceProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<PriceSnapshot, ProviderError> {
        let url = format!("{}/api/v3/ticker/24hr", self.base_url);
        let body = get_text(&self.http, &url, &[("symbol", symbol.to_string())]).await?;
        parse_ticker(&body)
    }

    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>, ProviderError> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit = request.limit.clamp(1, Self::MAX_KLINES);
        let body = get_text(
            &self.http,
            &url,
            &[
                ("symbol", request.symbol.clone()),
                ("interval", request.native_interval.to_string()),
                ("limit", limit.to_string()),
            ],
        )
        .await?;
        parse_klines(&body)
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Ticker24h {
    last_price: String,
    price_change_percent: String,
    high_price: Option<String>,
    low_price: Option<String>,
    volume: Option<String>,
}

/// Parse `/api/v3/ticker/24hr`.
pub fn parse_ticker(body: &str) -> Result<PriceSnapshot, ProviderError> {
    let t: Ticker24h = serde_json::from_str(body).map_err(malformed)?;
    let field = |raw: Option<String>, name: &str| -> Result<Option<f64>, ProviderError> {
        raw.map(|s| number(&Value::String(s), name)).transpose()
    };
    Ok(PriceSnapshot {
        price: number(&Value::String(t.last_price), "lastPrice")?,
        change_pct: number(&Value::String(t.price_change_percent), "priceChangePercent")?,
        high: field(t.high_price, "highPrice")?,
        low: field(t.low_price, "lowPrice")?,
        volume: field(t.volume, "volume")?,
    })
}

/// Parse `/api/v3/klines`: an array of
/// `[openTimeMs, "open", "high", "low", "close", "volume", closeTimeMs, ...]`.
pub fn parse_klines(body: &str) -> Result<Vec<Candle>, ProviderError> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body).map_err(malformed)?;
    rows.iter()
        .map(|row| {
            if row.len() < 6 {
                return Err(ProviderError::Malformed(format!(
                    "kline row has {} fields, expected at least 6",
                    row.len()
                )));
            }
            Ok(Candle {
                time: integer(&row[0], "openTime")?,
                open: number(&row[1], "open")?,
                high: number(&row[2], "high")?,
                low: number(&row[3], "low")?,
                close: number(&row[4], "close")?,
                volume: number(&row[5], "volume")?,
            })
        })
        .collect()
}
