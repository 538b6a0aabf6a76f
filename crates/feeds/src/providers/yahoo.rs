use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use common::{Candle, CandleRequest, MarketDataProvider, PriceSnapshot, ProviderError, ProviderKind};

use super::malformed;
use crate::http::get_text;

/// Yahoo Finance chart API, used as the historical-quote fallback.
pub struct YahooProvider {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl YahooProvider {
    pub const BASE_URL: &'static str = "https://query1.finance.yahoo.com";

    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            timeout: ProviderKind::Yahoo.default_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.base_url, symbol)
    }
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Yahoo
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<PriceSnapshot, ProviderError> {
        let body = get_text(
            &self.http,
            &self.chart_url(symbol),
            &[("interval", "1d".to_string()), ("range", "5d".to_string())],
        )
        .await?;
        parse_chart_quote(&body)
    }

    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>, ProviderError> {
        let end = Utc::now().timestamp();
        let start = end - request.limit as i64 * request.interval.seconds();
        let body = get_text(
            &self.http,
            &self.chart_url(&request.symbol),
            &[
                ("interval", request.native_interval.to_string()),
                ("period1", start.to_string()),
                ("period2", end.to_string()),
            ],
        )
        .await?;
        parse_chart_candles(&body)
    }
}

// ─── Response types ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<Value>,
}

#[derive(Deserialize)]
struct ChartResult {
    meta: Meta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    regular_market_price: Option<f64>,
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<f64>,
}

#[derive(Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteBlock>,
}

#[derive(Deserialize, Default)]
struct QuoteBlock {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

fn first_result(body: &str) -> Result<ChartResult, ProviderError> {
    let resp: ChartResponse = serde_json::from_str(body).map_err(malformed)?;
    if let Some(err) = resp.chart.error.filter(|e| !e.is_null()) {
        return Err(ProviderError::Malformed(format!("chart error: {err}")));
    }
    resp.chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| ProviderError::Malformed("chart has no result".into()))
}

/// Parse the `meta` block of a chart response into a quote.
pub fn parse_chart_quote(body: &str) -> Result<PriceSnapshot, ProviderError> {
    let meta = first_result(body)?.meta;
    let price = meta
        .regular_market_price
        .ok_or_else(|| ProviderError::Malformed("missing regularMarketPrice".into()))?;
    let change_pct = match meta.chart_previous_close.or(meta.previous_close) {
        Some(prev) if prev > 0.0 => (price - prev) / prev * 100.0,
        _ => 0.0,
    };

    Ok(PriceSnapshot {
        price,
        change_pct,
        high: meta.regular_market_day_high,
        low: meta.regular_market_day_low,
        volume: meta.regular_market_volume,
    })
}

/// Parse chart `timestamp` + `indicators.quote[0]` into candles. Buckets with
/// any null OHLC value (halted or still-forming bars) are skipped.
pub fn parse_chart_candles(body: &str) -> Result<Vec<Candle>, ProviderError> {
    let result = first_result(body)?;
    let quote = result
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .unwrap_or_default();

    let at = |v: &[Option<f64>], i: usize| v.get(i).copied().flatten();

    Ok(result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &time)| {
            Some(Candle {
                time,
                open: at(&quote.open, i)?,
                high: at(&quote.high, i)?,
                low: at(&quote.low, i)?,
                close: at(&quote.close, i)?,
                volume: at(&quote.volume, i).unwrap_or(0.0),
            })
        })
        .collect())
}
