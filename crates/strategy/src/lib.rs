pub mod config;
pub mod detector;
pub mod indicators;

pub use config::SignalConfig;
pub use detector::detect_signals;
pub use indicators::{BollingerBands, IndicatorSet};

use serde::Serialize;
use tracing::debug;

use common::{CandleSeries, Signal};

/// Indicators and signals derived from one candle series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Analysis {
    pub indicators: IndicatorSet,
    pub signals: Vec<Signal>,
}

/// Run the indicator engine and the signal detector over `series`.
pub fn analyze(series: &CandleSeries, config: &SignalConfig) -> Analysis {
    let indicators = IndicatorSet::compute(&series.candles, config);
    let signals = detect_signals(&series.candles, &indicators, config);
    debug!(
        symbol = %series.symbol,
        interval = %series.interval,
        candles = series.len(),
        signals = signals.len(),
        "Analysis complete"
    );
    Analysis { indicators, signals }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::{Candle, Interval, ProviderKind};

    fn series(n: usize) -> CandleSeries {
        CandleSeries {
            symbol: "BTC".into(),
            requested_interval: Interval::H1,
            interval: Interval::H1,
            provider: ProviderKind::Binance,
            note: None,
            candles: (0..n)
                .map(|i| Candle::flat(1_700_000_000 + i as i64 * 3600, 100.0 + i as f64, 1.0))
                .collect(),
        }
    }

    #[test]
    fn analysis_is_aligned_with_series() {
        let analysis = analyze(&series(50), &SignalConfig::default());
        assert!(analysis.indicators.is_aligned(50));
    }

    #[test]
    fn short_series_has_indicators_but_no_signals() {
        let analysis = analyze(&series(10), &SignalConfig::default());
        assert_eq!(analysis.indicators.len(), 10);
        assert!(analysis.signals.is_empty());
    }

    #[test]
    fn analysis_serializes_warm_up_as_null() {
        let analysis = analyze(&series(25), &SignalConfig::default());
        let json = serde_json::to_value(&analysis).unwrap();
        assert!(json["indicators"]["bollinger"]["middle"][0].is_null());
        assert!(json["indicators"]["bollinger"]["middle"][19].is_number());
        assert_eq!(json["signals"].as_array().unwrap().len(), 0);
    }
}
