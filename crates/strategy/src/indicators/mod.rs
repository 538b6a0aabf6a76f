pub mod bollinger;
pub mod ema;
pub mod rsi;
pub mod sma;

pub use bollinger::BollingerBands;
pub use ema::ema;
pub use rsi::{rsi, RSI_SEED};
pub use sma::{sma, stddev};

use serde::Serialize;

use common::Candle;

use crate::config::SignalConfig;

/// Indicator arrays aligned index-for-index with a candle series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorSet {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub bollinger: BollingerBands,
    pub rsi: Vec<f64>,
    /// Entries of `rsi` before this index are seed placeholders.
    pub rsi_period: usize,
}

impl IndicatorSet {
    pub fn compute(candles: &[Candle], config: &SignalConfig) -> Self {
        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        Self {
            ema_fast: ema(&closes, config.ema_fast),
            ema_slow: ema(&closes, config.ema_slow),
            bollinger: BollingerBands::compute(&closes, config.bb_period, config.bb_multiplier),
            rsi: rsi(&closes, config.rsi_period),
            rsi_period: config.rsi_period,
        }
    }

    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }

    /// Computed RSI at `i`, or `None` for seeded or out-of-range positions.
    pub fn rsi_at(&self, i: usize) -> Option<f64> {
        if i < self.rsi_period {
            return None;
        }
        self.rsi.get(i).copied()
    }

    /// True when every array has exactly `len` entries.
    pub fn is_aligned(&self, len: usize) -> bool {
        self.ema_fast.len() == len
            && self.ema_slow.len() == len
            && self.bollinger.upper.len() == len
            && self.bollinger.middle.len() == len
            && self.bollinger.lower.len() == len
            && self.rsi.len() == len
    }
}
