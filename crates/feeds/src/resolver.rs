use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use reqwest::Client;
use tracing::{error, info, warn};

use common::{
    CandleRequest, CandleSeries, Config, Error, Interval, MarketDataProvider, ProviderError,
    ProviderKind, Quote, Result, SourceAttempt,
};

use crate::interval::translate;
use crate::normalize::{normalize_candles, validate_snapshot};
use crate::providers::build_provider;
use crate::symbols::{normalize_symbol, provider_symbol};

/// Tries providers one at a time in priority order and returns the first
/// structurally valid result.
///
/// Only one provider call is ever in flight per request. Individual provider
/// failures are logged and recorded, never returned on their own.
pub struct SourceResolver {
    providers: Vec<Arc<dyn MarketDataProvider>>,
}

impl SourceResolver {
    /// Upper bound on candles per request.
    pub const MAX_LIMIT: usize = 1000;

    pub fn new(providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        Self { providers }
    }

    /// Build the cascade from `cfg.provider_order`.
    pub fn from_config(cfg: &Config, http: Client) -> Self {
        let providers = cfg
            .provider_order
            .iter()
            .map(|kind| build_provider(*kind, http.clone(), cfg))
            .collect();
        Self::new(providers)
    }

    /// Providers in the order they will be tried.
    pub fn provider_order(&self) -> Vec<ProviderKind> {
        self.providers.iter().map(|p| p.kind()).collect()
    }

    /// Current price for `symbol` from the first provider that answers.
    pub async fn resolve_quote(&self, symbol: &str) -> Result<Quote> {
        let base = normalize_symbol(symbol);
        let mut attempts = Vec::new();

        for provider in &self.providers {
            let kind = provider.kind();
            let native = provider_symbol(kind, &base);
            let started = Instant::now();

            let outcome = attempt(provider.as_ref(), provider.fetch_quote(&native))
                .await
                .and_then(|snap| validate_snapshot(&snap).map(|_| snap));

            match outcome {
                Ok(snap) => {
                    info!(provider = %kind, symbol = %base, price = snap.price, "Quote resolved");
                    return Ok(Quote {
                        symbol: base,
                        price: snap.price,
                        change_pct: snap.change_pct,
                        high: snap.high,
                        low: snap.low,
                        volume: snap.volume,
                        provider: kind,
                        fetched_at: Utc::now(),
                    });
                }
                Err(e) => record_failure(&mut attempts, kind, e, started),
            }
        }

        Err(exhausted(format!("quote {base}"), attempts))
    }

    /// Candle series for `symbol` at `interval`, keeping the most recent
    /// `limit` candles (clamped to `1..=MAX_LIMIT`).
    ///
    /// The delivered interval may be coarser than requested when the
    /// answering provider cannot serve the requested width.
    pub async fn resolve_candles(
        &self,
        symbol: &str,
        interval: Interval,
        limit: usize,
    ) -> Result<CandleSeries> {
        let base = normalize_symbol(symbol);
        let limit = limit.clamp(1, Self::MAX_LIMIT);
        let mut attempts = Vec::new();

        for provider in &self.providers {
            let kind = provider.kind();
            let started = Instant::now();

            let Some(translation) = translate(kind, interval) else {
                let e = ProviderError::Unsupported(format!("no native interval at or above {interval}"));
                record_failure(&mut attempts, kind, e, started);
                continue;
            };

            let request = CandleRequest {
                symbol: provider_symbol(kind, &base),
                interval: translation.interval,
                native_interval: translation.native,
                limit,
            };

            let outcome = attempt(provider.as_ref(), provider.fetch_candles(&request))
                .await
                .and_then(|raw| normalize_candles(raw, translation.interval, limit));

            match outcome {
                Ok(candles) => {
                    let note = translation.is_substituted().then(|| {
                        format!(
                            "requested {interval}, delivered {} by {kind}",
                            translation.interval
                        )
                    });
                    info!(
                        provider = %kind,
                        symbol = %base,
                        interval = %translation.interval,
                        candles = candles.len(),
                        substituted = translation.is_substituted(),
                        "Candles resolved"
                    );
                    return Ok(CandleSeries {
                        symbol: base,
                        requested_interval: interval,
                        interval: translation.interval,
                        provider: kind,
                        note,
                        candles,
                    });
                }
                Err(e) => record_failure(&mut attempts, kind, e, started),
            }
        }

        Err(exhausted(format!("candles {base} {interval}"), attempts))
    }
}

/// Run one provider call under its timeout. Dropping the future on expiry
/// abandons the underlying request.
async fn attempt<T, F>(provider: &dyn MarketDataProvider, call: F) -> std::result::Result<T, ProviderError>
where
    F: Future<Output = std::result::Result<T, ProviderError>>,
{
    let budget = provider.timeout();
    match tokio::time::timeout(budget, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::Timeout(budget)),
    }
}

fn record_failure(
    attempts: &mut Vec<SourceAttempt>,
    provider: ProviderKind,
    e: ProviderError,
    started: Instant,
) {
    warn!(
        provider = %provider,
        error = %e,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Provider attempt failed, trying next source"
    );
    attempts.push(SourceAttempt {
        provider,
        error: e.to_string(),
    });
}

fn exhausted(request: String, attempts: Vec<SourceAttempt>) -> Error {
    error!(%request, tried = attempts.len(), "All data sources exhausted");
    Error::AllSourcesExhausted { request, attempts }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
