use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use common::{Candle, CandleRequest, Interval, MarketDataProvider, PriceSnapshot, ProviderError, ProviderKind};

use super::{integer, malformed, number, optional_number};
use crate::http::get_text;

/// CoinGecko aggregator API. OHLC candles carry no volume.
pub struct CoinGeckoProvider {
    base_url: String,
    http: Client,
    timeout: Duration,
}

impl CoinGeckoProvider {
    pub const BASE_URL: &'static str = "https://api.coingecko.com/api/v3";

    /// `days` values accepted by the OHLC endpoint.
    const OHLC_DAYS: [u32; 4] = [1, 7, 14, 30];

    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
            timeout: ProviderKind::CoinGecko.default_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Pick the OHLC `days` window that yields `interval` buckets and covers as
/// many of the `limit` candles as the granularity rules allow.
pub fn ohlc_days(interval: Interval, limit: usize) -> Result<u32, ProviderError> {
    match interval {
        Interval::M30 => Ok(1),
        Interval::H4 => {
            let needed = (limit as u64 * interval.seconds() as u64).div_ceil(86_400) as u32;
            Ok(CoinGeckoProvider::OHLC_DAYS
                .into_iter()
                .filter(|d| *d > 2)
                .find(|d| *d >= needed)
                .unwrap_or(30))
        }
        other => Err(ProviderError::Unsupported(format!(
            "coingecko cannot deliver {other} candles"
        ))),
    }
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::CoinGecko
    }

    fn timeout(&self) -> Duration {
        self.timeout
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<PriceSnapshot, ProviderError> {
        let url = format!("{}/simple/price", self.base_url);
        let body = get_text(
            &self.http,
            &url,
            &[
                ("ids", symbol.to_string()),
                ("vs_currencies", "usd".to_string()),
                ("include_24hr_change", "true".to_string()),
                ("include_24hr_vol", "true".to_string()),
            ],
        )
        .await?;
        parse_simple_price(&body, symbol)
    }

    async fn fetch_candles(&self, request: &CandleRequest) -> Result<Vec<Candle>, ProviderError> {
        let days = ohlc_days(request.interval, request.limit)?;
        let url = format!("{}/coins/{}/ohlc", self.base_url, request.symbol);
        let body = get_text(
            &self.http,
            &url,
            &[("vs_currency", "usd".to_string()), ("days", days.to_string())],
        )
        .await?;
        parse_ohlc(&body, request.interval)
    }
}

/// Parse `/simple/price`: `{"bitcoin": {"usd": 1, "usd_24h_change": 2, "usd_24h_vol": 3}}`.
pub fn parse_simple_price(body: &str, id: &str) -> Result<PriceSnapshot, ProviderError> {
    let map: HashMap<String, HashMap<String, Value>> =
        serde_json::from_str(body).map_err(malformed)?;
    let entry = map
        .get(id)
        .ok_or_else(|| ProviderError::Malformed(format!("no price for '{id}'")))?;
    let price = entry
        .get("usd")
        .ok_or_else(|| ProviderError::Malformed("missing 'usd' price".into()))?;

    Ok(PriceSnapshot {
        price: number(price, "usd")?,
        change_pct: optional_number(entry.get("usd_24h_change"), "usd_24h_change")?.unwrap_or(0.0),
        high: None,
        low: None,
        volume: optional_number(entry.get("usd_24h_vol"), "usd_24h_vol")?,
    })
}

/// Parse `/coins/{id}/ohlc`: `[[closeTimeMs, open, high, low, close], ...]`.
/// Row times mark the bucket close and are shifted back to the bucket start.
pub fn parse_ohlc(body: &str, interval: Interval) -> Result<Vec<Candle>, ProviderError> {
    let rows: Vec<Vec<Value>> = serde_json::from_str(body).map_err(malformed)?;
    let width_ms = interval.seconds() * 1000;
    rows.iter()
        .map(|row| {
            if row.len() < 5 {
                return Err(ProviderError::Malformed(format!(
                    "ohlc row has {} fields, expected 5",
                    row.len()
                )));
            }
            Ok(Candle {
                time: integer(&row[0], "time")?.saturating_sub(width_ms),
                open: number(&row[1], "open")?,
                high: number(&row[2], "high")?,
                low: number(&row[3], "low")?,
                close: number(&row[4], "close")?,
                volume: 0.0,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ohlc_rows_without_volume() {
        let body = "[[1699999200000, 37000.5, 37100.25, 36950.0, 37050.75], [1700001000000, 37050.75, 37060.0, 37001.0, 37010.0]]";
        let candles = parse_ohlc(body, Interval::M30).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].high, 37100.25);
        assert!(candles.iter().all(|c| c.volume == 0.0));
    }

    #[test]
    fn ohlc_times_are_bucket_starts() {
        // 4h row closing at 2023-11-14T16:00:00Z covers 12:00-16:00
        let body = "[[1699977600000, 37000.5, 37100.25, 36950.0, 37050.75]]";
        let candles = parse_ohlc(body, Interval::H4).unwrap();
        assert_eq!(candles[0].time, 1_699_963_200_000);
        assert_eq!(candles[0].time % (4 * 3_600_000), 0);

        let candles = parse_ohlc("[[1700001000000, 1, 2, 0.5, 1.5]]", Interval::M30).unwrap();
        assert_eq!(candles[0].time, 1_699_999_200_000);
    }

    #[test]
    fn parses_simple_price() {
        let body = r#"{"bitcoin":{"usd":37425.5,"usd_24h_vol":15000000000.12,"usd_24h_change":1.234}}"#;
        let snap = parse_simple_price(body, "bitcoin").unwrap();
        assert_eq!(snap.price, 37425.5);
        assert_eq!(snap.change_pct, 1.234);
        assert_eq!(snap.volume, Some(15000000000.12));
        assert_eq!(snap.high, None);
    }

    #[test]
    fn unknown_id_is_malformed() {
        assert!(matches!(
            parse_simple_price("{}", "bitcoin"),
            Err(ProviderError::Malformed(_))
        ));
    }

    #[test]
    fn days_window_matches_granularity() {
        assert_eq!(ohlc_days(Interval::M30, 500).unwrap(), 1);
        assert_eq!(ohlc_days(Interval::H4, 10).unwrap(), 7);
        assert_eq!(ohlc_days(Interval::H4, 60).unwrap(), 14);
        assert_eq!(ohlc_days(Interval::H4, 1000).unwrap(), 30);
        assert!(matches!(
            ohlc_days(Interval::H1, 10),
            Err(ProviderError::Unsupported(_))
        ));
    }
}
