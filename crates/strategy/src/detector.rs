use common::{Candle, Direction, IndicatorSnapshot, Signal};

use crate::config::SignalConfig;
use crate::indicators::IndicatorSet;

/// Shorter series produce no signals.
pub const MIN_CANDLES: usize = 25;
/// First index with full trailing windows for every default indicator.
pub const FIRST_INDEX: usize = 22;

const CROSS_WEIGHT: u8 = 40;
const BAND_WEIGHT: u8 = 30;
const RSI_WEIGHT: u8 = 30;
const TREND_BONUS: u8 = 10;
const MOMENTUM_BONUS: u8 = 10;
const MAX_STRENGTH: u8 = 100;

pub const GOLDEN_CROSS: &str = "EMA Golden Cross";
pub const LOWER_BAND_BOUNCE: &str = "Bollinger Lower Band Bounce";
pub const OVERSOLD_RECOVERY: &str = "RSI Oversold Recovery";
pub const DEATH_CROSS: &str = "EMA Death Cross";
pub const UPPER_BAND_REJECTION: &str = "Bollinger Upper Band Rejection";
pub const OVERBOUGHT_REJECTION: &str = "RSI Overbought Rejection";

/// Scan `candles` with their aligned indicators and return every signal, in
/// index order. At a single index a LONG and a SHORT may both be emitted
/// (LONG first) when both condition sets fire independently.
///
/// Returns an empty list for fewer than [`MIN_CANDLES`] candles or when the
/// indicator arrays are not aligned with the candles.
pub fn detect_signals(
    candles: &[Candle],
    indicators: &IndicatorSet,
    config: &SignalConfig,
) -> Vec<Signal> {
    if candles.len() < MIN_CANDLES || !indicators.is_aligned(candles.len()) {
        return Vec::new();
    }

    let mut signals = Vec::new();
    for i in FIRST_INDEX..candles.len() {
        let bar = Bar::at(candles, indicators, i);
        for direction in [Direction::Long, Direction::Short] {
            if let Some(signal) = evaluate(&bar, direction, config) {
                signals.push(signal);
            }
        }
    }
    signals
}

/// Values at `i` and `i - 1` needed by the rules.
struct Bar<'a> {
    index: usize,
    prev: &'a Candle,
    cur: &'a Candle,
    fast: (f64, f64),
    slow: (f64, f64),
    upper: (Option<f64>, Option<f64>),
    lower: (Option<f64>, Option<f64>),
    rsi: (Option<f64>, Option<f64>),
    rsi_raw: f64,
}

impl<'a> Bar<'a> {
    fn at(candles: &'a [Candle], ind: &IndicatorSet, i: usize) -> Self {
        let bb = &ind.bollinger;
        Self {
            index: i,
            prev: &candles[i - 1],
            cur: &candles[i],
            fast: (ind.ema_fast[i - 1], ind.ema_fast[i]),
            slow: (ind.ema_slow[i - 1], ind.ema_slow[i]),
            upper: (bb.upper[i - 1], bb.upper[i]),
            lower: (bb.lower[i - 1], bb.lower[i]),
            rsi: (ind.rsi_at(i - 1), ind.rsi_at(i)),
            rsi_raw: ind.rsi[i],
        }
    }
}

fn evaluate(bar: &Bar<'_>, direction: Direction, config: &SignalConfig) -> Option<Signal> {
    let (fast_prev, fast) = bar.fast;
    let (slow_prev, slow) = bar.slow;
    let (rsi_prev, rsi) = bar.rsi;
    let close = bar.cur.close;

    let mut strength: u8 = 0;
    let mut reasons = Vec::new();
    let mut fire = |hit: bool, weight: u8, label: &str| {
        if hit {
            strength = strength.saturating_add(weight);
            reasons.push(label.to_string());
        }
    };

    let (trend_favors, momentum_favors) = match direction {
        Direction::Long => {
            fire(fast_prev <= slow_prev && fast > slow, CROSS_WEIGHT, GOLDEN_CROSS);

            let bounce = match (bar.lower, rsi) {
                ((Some(lower_prev), Some(lower)), Some(r)) => {
                    bar.prev.low < lower_prev
                        && close > lower
                        && close > bar.prev.close
                        && r < 50.0
                }
                _ => false,
            };
            fire(bounce, BAND_WEIGHT, LOWER_BAND_BOUNCE);

            let recovery = matches!(
                (rsi_prev, rsi),
                (Some(p), Some(r)) if p <= config.rsi_oversold && r > config.rsi_oversold
            );
            fire(recovery, RSI_WEIGHT, OVERSOLD_RECOVERY);

            (fast > slow, rsi.is_some_and(|r| r < 50.0))
        }
        Direction::Short => {
            fire(fast_prev >= slow_prev && fast < slow, CROSS_WEIGHT, DEATH_CROSS);

            let rejection = match (bar.upper, rsi) {
                ((Some(upper_prev), Some(upper)), Some(r)) => {
                    bar.prev.high > upper_prev
                        && close < upper
                        && close < bar.prev.close
                        && r > 50.0
                }
                _ => false,
            };
            fire(rejection, BAND_WEIGHT, UPPER_BAND_REJECTION);

            let rejected = matches!(
                (rsi_prev, rsi),
                (Some(p), Some(r)) if p >= config.rsi_overbought && r < config.rsi_overbought
            );
            fire(rejected, RSI_WEIGHT, OVERBOUGHT_REJECTION);

            (fast < slow, rsi.is_some_and(|r| r > 50.0))
        }
    };

    if reasons.is_empty() {
        return None;
    }
    if trend_favors {
        strength = strength.saturating_add(TREND_BONUS);
    }
    if momentum_favors {
        strength = strength.saturating_add(MOMENTUM_BONUS);
    }
    let strength = strength.min(MAX_STRENGTH);
    if strength < config.min_strength {
        return None;
    }

    let (take_profit, stop_loss) = targets(close, direction, config);
    Some(Signal {
        direction,
        index: bar.index,
        time: bar.cur.time,
        entry: close,
        take_profit,
        stop_loss,
        strength,
        reasons,
        snapshot: IndicatorSnapshot {
            rsi: bar.rsi_raw,
            ema_fast: fast,
            ema_slow: slow,
        },
    })
}

/// Take-profit and stop-loss for an entry price.
pub fn targets(entry: f64, direction: Direction, config: &SignalConfig) -> (f64, f64) {
    let tp = config.take_profit_pct / 100.0;
    let sl = config.stop_loss_pct / 100.0;
    match direction {
        Direction::Long => (entry * (1.0 + tp), entry * (1.0 - sl)),
        Direction::Short => (entry * (1.0 - tp), entry * (1.0 + sl)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::BollingerBands;

    const T0: i64 = 1_700_000_000;

    fn flat_candles(n: usize) -> Vec<Candle> {
        (0..n).map(|i| Candle::flat(T0 + i as i64 * 60, 100.0, 1.0)).collect()
    }

    /// Quiet indicators: fast below slow, wide bands, RSI pinned at `rsi`.
    fn quiet(n: usize, rsi: f64) -> IndicatorSet {
        let mut rsi_values = vec![50.0; n];
        for v in rsi_values.iter_mut().skip(14) {
            *v = rsi;
        }
        IndicatorSet {
            ema_fast: vec![99.0; n],
            ema_slow: vec![100.0; n],
            bollinger: BollingerBands {
                upper: vec![Some(110.0); n],
                middle: vec![Some(100.0); n],
                lower: vec![Some(90.0); n],
            },
            rsi: rsi_values,
            rsi_period: 14,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn golden_cross_at_25_with_rsi_45() {
        let candles = flat_candles(30);
        let mut ind = quiet(30, 45.0);
        for v in ind.ema_fast.iter_mut().skip(25) {
            *v = 101.0;
        }

        let signals = detect_signals(&candles, &ind, &SignalConfig::default());
        assert_eq!(signals.len(), 1);
        let s = &signals[0];
        assert_eq!(s.direction, Direction::Long);
        assert_eq!(s.index, 25);
        assert_eq!(s.time, T0 + 25 * 60);
        assert_eq!(s.strength, 60);
        assert_eq!(s.reasons, vec![GOLDEN_CROSS.to_string()]);
        assert!(approx(s.take_profit, 101.5));
        assert!(approx(s.stop_loss, 99.2));
        assert_eq!(s.snapshot.rsi, 45.0);
        assert_eq!(s.snapshot.ema_fast, 101.0);
    }

    #[test]
    fn computed_reversal_series() {
        // 20 bars down, then 19 bars up
        let closes: Vec<f64> = (0..21)
            .map(|i| 120.0 - i as f64)
            .chain((1..20).map(|i| 100.0 + 2.0 * i as f64))
            .collect();
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::flat(T0 + i as i64 * 60, c, 1.0))
            .collect();
        let config = SignalConfig::default();
        let ind = IndicatorSet::compute(&candles, &config);

        let signals = detect_signals(&candles, &ind, &config);
        assert_eq!(signals.len(), 2, "{signals:#?}");

        assert_eq!(signals[0].index, 23);
        assert_eq!(signals[0].direction, Direction::Long);
        assert_eq!(signals[0].reasons, vec![OVERSOLD_RECOVERY.to_string()]);
        assert_eq!(signals[0].strength, 40);

        assert_eq!(signals[1].index, 27);
        assert_eq!(signals[1].direction, Direction::Long);
        assert_eq!(signals[1].reasons, vec![GOLDEN_CROSS.to_string()]);
        assert_eq!(signals[1].strength, 50);
    }

    #[test]
    fn oversold_recovery_alone() {
        let candles = flat_candles(30);
        let mut ind = quiet(30, 45.0);
        ind.rsi[27] = 25.0;
        ind.rsi[28] = 35.0;

        let signals = detect_signals(&candles, &ind, &SignalConfig::default());
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].index, 28);
        assert_eq!(signals[0].strength, 40);
        assert_eq!(signals[0].reasons, vec![OVERSOLD_RECOVERY.to_string()]);
    }

    #[test]
    fn lower_band_bounce() {
        let mut candles = flat_candles(30);
        candles[26].low = 85.0;
        candles[27] = Candle::flat(candles[27].time, 101.0, 1.0);
        let ind = quiet(30, 45.0);

        let signals = detect_signals(&candles, &ind, &SignalConfig::default());
        assert_eq!(signals.len(), 1);
        let s = &signals[0];
        assert_eq!(s.index, 27);
        assert_eq!(s.direction, Direction::Long);
        assert_eq!(s.reasons, vec![LOWER_BAND_BOUNCE.to_string()]);
        assert_eq!(s.strength, 40);
        assert_eq!(s.entry, 101.0);
    }

    #[test]
    fn bounce_requires_rsi_below_50() {
        let mut candles = flat_candles(30);
        candles[26].low = 85.0;
        candles[27] = Candle::flat(candles[27].time, 101.0, 1.0);
        let ind = quiet(30, 55.0);

        assert!(detect_signals(&candles, &ind, &SignalConfig::default()).is_empty());
    }

    #[test]
    fn upper_band_rejection() {
        let mut candles = flat_candles(30);
        candles[26].high = 115.0;
        candles[27] = Candle::flat(candles[27].time, 99.0, 1.0);
        let ind = quiet(30, 55.0);

        let signals = detect_signals(&candles, &ind, &SignalConfig::default());
        assert_eq!(signals.len(), 1);
        let s = &signals[0];
        assert_eq!(s.direction, Direction::Short);
        assert_eq!(s.reasons, vec![UPPER_BAND_REJECTION.to_string()]);
        assert_eq!(s.strength, 50);
        assert!(approx(s.take_profit, 99.0 * 0.985));
        assert!(approx(s.stop_loss, 99.0 * 1.008));
    }

    #[test]
    fn both_directions_at_one_index() {
        let mut candles = flat_candles(30);
        candles[24].high = 115.0;
        candles[25] = Candle::flat(candles[25].time, 99.0, 1.0);
        let mut ind = quiet(30, 55.0);
        for v in ind.ema_fast.iter_mut().skip(25) {
            *v = 101.0;
        }

        let signals = detect_signals(&candles, &ind, &SignalConfig::default());
        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].direction, Direction::Long);
        assert_eq!(signals[0].index, 25);
        assert_eq!(signals[0].strength, 50);
        assert_eq!(signals[1].direction, Direction::Short);
        assert_eq!(signals[1].index, 25);
        assert_eq!(signals[1].strength, 40);
    }

    #[test]
    fn overbought_rejection_and_strength_cap() {
        let mut candles = flat_candles(30);
        candles[26].high = 115.0;
        candles[27] = Candle::flat(candles[27].time, 99.0, 1.0);
        let mut ind = quiet(30, 55.0);
        ind.rsi[26] = 75.0;
        ind.rsi[27] = 60.0;
        for v in ind.ema_fast.iter_mut().take(27) {
            *v = 101.0;
        }

        let signals = detect_signals(&candles, &ind, &SignalConfig::default());
        assert_eq!(signals.len(), 1);
        let s = &signals[0];
        assert_eq!(s.direction, Direction::Short);
        assert_eq!(
            s.reasons,
            vec![
                DEATH_CROSS.to_string(),
                UPPER_BAND_REJECTION.to_string(),
                OVERBOUGHT_REJECTION.to_string()
            ]
        );
        assert_eq!(s.strength, 100);
    }

    #[test]
    fn min_strength_filters_weak_candidates() {
        let candles = flat_candles(30);
        let mut ind = quiet(30, 45.0);
        ind.rsi[27] = 25.0;
        ind.rsi[28] = 35.0;
        let config = SignalConfig {
            min_strength: 50,
            ..SignalConfig::default()
        };

        assert!(detect_signals(&candles, &ind, &config).is_empty());
    }

    #[test]
    fn short_history_yields_nothing() {
        let config = SignalConfig::default();
        for n in [10, 24] {
            let candles = flat_candles(n);
            let mut ind = quiet(n, 45.0);
            ind.ema_fast[n - 1] = 101.0;
            assert!(detect_signals(&candles, &ind, &config).is_empty());
        }
    }

    #[test]
    fn misaligned_indicators_yield_nothing() {
        let candles = flat_candles(30);
        let mut ind = quiet(29, 45.0);
        ind.ema_fast[25] = 101.0;
        assert!(detect_signals(&candles, &ind, &SignalConfig::default()).is_empty());
    }

    #[test]
    fn crossing_before_first_index_is_ignored() {
        let candles = flat_candles(30);
        let mut ind = quiet(30, 45.0);
        for v in ind.ema_fast.iter_mut().skip(21) {
            *v = 101.0;
        }
        assert!(detect_signals(&candles, &ind, &SignalConfig::default()).is_empty());
    }

    #[test]
    fn detection_is_deterministic() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.4).sin() * 5.0).collect();
        let candles: Vec<Candle> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::flat(T0 + i as i64 * 60, c, 1.0))
            .collect();
        let config = SignalConfig::default();
        let ind = IndicatorSet::compute(&candles, &config);
        assert_eq!(
            detect_signals(&candles, &ind, &config),
            detect_signals(&candles, &ind, &config)
        );
    }

    #[test]
    fn targets_mirror_by_direction() {
        let config = SignalConfig::default();
        let (tp, sl) = targets(200.0, Direction::Long, &config);
        assert!(tp > 200.0 && sl < 200.0);
        let (tp, sl) = targets(200.0, Direction::Short, &config);
        assert!(tp < 200.0 && sl > 200.0);
    }
}
