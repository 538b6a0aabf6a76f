use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use common::{CandleSeries, Interval, Quote};
use strategy::{analyze, Analysis};

use crate::{ApiError, AppState};

/// Candles returned when the caller does not ask for a count.
pub const DEFAULT_LIMIT: usize = 100;

pub fn market_router() -> Router<AppState> {
    Router::new()
        .route("/api/quote/:symbol", get(get_quote))
        .route("/api/candles/:symbol", get(get_candles))
        .route("/api/analysis/:symbol", get(get_analysis))
}

#[derive(Debug, Default, Deserialize)]
struct SeriesQuery {
    interval: Option<String>,
    limit: Option<usize>,
}

impl SeriesQuery {
    fn interval(&self) -> Interval {
        self.interval
            .as_deref()
            .map(Interval::parse_or_default)
            .unwrap_or(Interval::DEFAULT)
    }

    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }
}

#[derive(Serialize)]
struct SeriesResponse {
    #[serde(flatten)]
    series: CandleSeries,
    /// A coarser interval than requested was delivered.
    degraded: bool,
}

impl From<CandleSeries> for SeriesResponse {
    fn from(series: CandleSeries) -> Self {
        let degraded = series.is_substituted();
        Self { series, degraded }
    }
}

#[derive(Serialize)]
struct AnalysisResponse {
    series: SeriesResponse,
    #[serde(flatten)]
    analysis: Analysis,
}

fn validate_symbol(symbol: &str) -> Result<&str, ApiError> {
    let symbol = symbol.trim();
    let ok = !symbol.is_empty()
        && symbol.len() <= 20
        && symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '/'));
    if ok {
        Ok(symbol)
    } else {
        Err(ApiError::BadRequest(format!("invalid symbol '{symbol}'")))
    }
}

// ─── Quote ────────────────────────────────────────────────────────────────────

async fn get_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Quote>, ApiError> {
    let symbol = validate_symbol(&symbol)?;
    let quote = state.resolver.resolve_quote(symbol).await?;
    Ok(Json(quote))
}

// ─── Candles ──────────────────────────────────────────────────────────────────

async fn get_candles(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(q): Query<SeriesQuery>,
) -> Result<Json<SeriesResponse>, ApiError> {
    let symbol = validate_symbol(&symbol)?;
    let series = state
        .resolver
        .resolve_candles(symbol, q.interval(), q.limit())
        .await?;
    Ok(Json(series.into()))
}

// ─── Analysis ─────────────────────────────────────────────────────────────────

async fn get_analysis(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(q): Query<SeriesQuery>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let symbol = validate_symbol(&symbol)?;
    let series = state
        .resolver
        .resolve_candles(symbol, q.interval(), q.limit())
        .await?;
    let analysis = analyze(&series, &state.signal_config);
    if let Some(latest) = analysis.signals.last() {
        info!(
            symbol = %series.symbol,
            direction = %latest.direction,
            strength = latest.strength,
            "Latest signal"
        );
    }
    Ok(Json(AnalysisResponse {
        series: series.into(),
        analysis,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_defaults() {
        let q = SeriesQuery::default();
        assert_eq!(q.interval(), Interval::M15);
        assert_eq!(q.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn unknown_interval_falls_back() {
        let q = SeriesQuery {
            interval: Some("7m".into()),
            limit: Some(5),
        };
        assert_eq!(q.interval(), Interval::M15);
        assert_eq!(q.limit(), 5);
    }

    #[test]
    fn symbol_validation() {
        assert_eq!(validate_symbol(" btc ").unwrap(), "btc");
        assert!(validate_symbol("BTC-USD").is_ok());
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol("<script>").is_err());
    }
}
