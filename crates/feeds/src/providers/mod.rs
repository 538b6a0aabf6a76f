pub mod binance;
pub mod coincap;
pub mod coingecko;
pub mod yahoo;

pub use binance::BinanceProvider;
pub use coincap::CoinCapProvider;
pub use coingecko::CoinGeckoProvider;
pub use yahoo::YahooProvider;

use std::sync::Arc;

use reqwest::Client;
use serde_json::Value;

use common::{Config, MarketDataProvider, ProviderError, ProviderKind};

/// Build the adapter for one provider variant, honouring config overrides.
pub fn build_provider(kind: ProviderKind, http: Client, cfg: &Config) -> Arc<dyn MarketDataProvider> {
    let timeout = cfg.timeout_for(kind);
    let base_url = cfg.base_url_for(kind).map(str::to_string);
    match kind {
        ProviderKind::Binance => Arc::new(
            BinanceProvider::new(http, base_url.unwrap_or_else(|| BinanceProvider::BASE_URL.into()))
                .with_timeout(timeout),
        ),
        ProviderKind::BinanceUs => Arc::new(
            BinanceProvider::us(http, base_url.unwrap_or_else(|| BinanceProvider::US_BASE_URL.into()))
                .with_timeout(timeout),
        ),
        ProviderKind::CoinGecko => Arc::new(
            CoinGeckoProvider::new(http, base_url.unwrap_or_else(|| CoinGeckoProvider::BASE_URL.into()))
                .with_timeout(timeout),
        ),
        ProviderKind::CoinCap => Arc::new(
            CoinCapProvider::new(http, base_url.unwrap_or_else(|| CoinCapProvider::BASE_URL.into()))
                .with_timeout(timeout),
        ),
        ProviderKind::Yahoo => Arc::new(
            YahooProvider::new(http, base_url.unwrap_or_else(|| YahooProvider::BASE_URL.into()))
                .with_timeout(timeout),
        ),
    }
}

// ─── Shared payload helpers ───────────────────────────────────────────────────

pub(crate) fn malformed(e: impl std::fmt::Display) -> ProviderError {
    ProviderError::Malformed(e.to_string())
}

/// Read a price-like field that providers send either as a JSON number or a
/// decimal string.
pub(crate) fn number(value: &Value, field: &str) -> Result<f64, ProviderError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed
        .filter(|v| v.is_finite())
        .ok_or_else(|| ProviderError::Malformed(format!("field '{field}' is not numeric: {value}")))
}

/// Like [`number`] but `null`/missing maps to `None`.
pub(crate) fn optional_number(value: Option<&Value>, field: &str) -> Result<Option<f64>, ProviderError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(v) => number(v, field).map(Some),
    }
}

pub(crate) fn integer(value: &Value, field: &str) -> Result<i64, ProviderError> {
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
        .ok_or_else(|| ProviderError::Malformed(format!("field '{field}' is not an integer: {value}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_accepts_strings_and_numbers() {
        assert_eq!(number(&json!("42.5"), "p").unwrap(), 42.5);
        assert_eq!(number(&json!(42.5), "p").unwrap(), 42.5);
        assert!(number(&json!("abc"), "p").is_err());
        assert!(number(&json!(null), "p").is_err());
    }

    #[test]
    fn optional_number_maps_null_to_none() {
        assert_eq!(optional_number(None, "v").unwrap(), None);
        assert_eq!(optional_number(Some(&json!(null)), "v").unwrap(), None);
        assert_eq!(optional_number(Some(&json!("1")), "v").unwrap(), Some(1.0));
    }

    #[test]
    fn build_provider_follows_config() {
        let cfg = Config {
            provider_timeout: Some(std::time::Duration::from_secs(3)),
            ..Config::default()
        };
        let http = Client::new();
        for kind in ProviderKind::ALL {
            let provider = build_provider(kind, http.clone(), &cfg);
            assert_eq!(provider.kind(), kind);
            assert_eq!(provider.timeout(), std::time::Duration::from_secs(3));
        }
    }
}
