use serde::{Deserialize, Serialize};

use common::{Error, Result};

/// Signal detector parameters (TOML). Every field is optional.
///
/// Example `config/signals.toml`:
/// ```toml
/// ema_fast = 9
/// ema_slow = 21
/// rsi_period = 14
/// take_profit_pct = 1.5
/// stop_loss_pct = 0.8
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SignalConfig {
    pub ema_fast: usize,
    pub ema_slow: usize,
    /// Bollinger Band SMA window.
    pub bb_period: usize,
    /// Band half-width in standard deviations.
    pub bb_multiplier: f64,
    pub rsi_period: usize,
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    /// Take-profit distance from entry, in percent.
    pub take_profit_pct: f64,
    /// Stop-loss distance from entry, in percent.
    pub stop_loss_pct: f64,
    /// Candidates scoring below this are dropped.
    pub min_strength: u8,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            ema_fast: 9,
            ema_slow: 21,
            bb_period: 20,
            bb_multiplier: 2.0,
            rsi_period: 14,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
            take_profit_pct: 1.5,
            stop_loss_pct: 0.8,
            min_strength: 30,
        }
    }
}

impl SignalConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: SignalConfig = toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a TOML file. Panics on error; only called at startup.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read signal config at '{path}': {e}"));
        Self::from_toml_str(&content)
            .unwrap_or_else(|e| panic!("Invalid signal config at '{path}': {e}"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.ema_fast == 0 || self.ema_slow == 0 || self.bb_period == 0 {
            return Err(Error::Config("indicator periods must be positive".into()));
        }
        if self.ema_fast >= self.ema_slow {
            return Err(Error::Config(format!(
                "ema_fast ({}) must be shorter than ema_slow ({})",
                self.ema_fast, self.ema_slow
            )));
        }
        if self.rsi_period < 2 {
            return Err(Error::Config("rsi_period must be >= 2".into()));
        }
        if self.bb_multiplier.is_nan() || self.bb_multiplier < 0.0 {
            return Err(Error::Config("bb_multiplier must be non-negative".into()));
        }
        if !(0.0..=100.0).contains(&self.rsi_oversold)
            || !(0.0..=100.0).contains(&self.rsi_overbought)
            || self.rsi_oversold >= self.rsi_overbought
        {
            return Err(Error::Config(
                "rsi thresholds must satisfy 0 <= oversold < overbought <= 100".into(),
            ));
        }
        let non_positive = |x: f64| x.is_nan() || x <= 0.0;
        if non_positive(self.take_profit_pct) || non_positive(self.stop_loss_pct) {
            return Err(Error::Config("take-profit and stop-loss must be positive".into()));
        }
        Ok(())
    }
}
