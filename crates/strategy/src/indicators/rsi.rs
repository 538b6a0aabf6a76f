/// Neutral value used for positions before the first computed RSI.
pub const RSI_SEED: f64 = 50.0;

/// RSI (Relative Strength Index) series.
///
/// Uses Wilder's smoothed moving average (same as TradingView / standard RSI).
/// The first `period` entries are [`RSI_SEED`] placeholders; index `period` is
/// the first real value. Output length always equals input length.
pub fn rsi(closes: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![RSI_SEED; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let changes: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |c: f64| if c > 0.0 { c } else { 0.0 };
    let loss = |c: f64| if c < 0.0 { -c } else { 0.0 };

    // First average gain/loss over the initial `period` changes
    let initial = &changes[..period];
    let mut avg_gain = initial.iter().map(|&c| gain(c)).sum::<f64>() / period as f64;
    let mut avg_loss = initial.iter().map(|&c| loss(c)).sum::<f64>() / period as f64;
    out[period] = from_averages(avg_gain, avg_loss);

    // Wilder smoothing over remaining changes
    let n = period as f64;
    for (offset, &change) in changes[period..].iter().enumerate() {
        avg_gain = (avg_gain * (n - 1.0) + gain(change)) / n;
        avg_loss = (avg_loss * (n - 1.0) + loss(change)) / n;
        out[period + 1 + offset] = from_averages(avg_gain, avg_loss);
    }
    out
}

fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        return 100.0;
    }
    let rs = avg_gain / avg_loss;
    100.0 - 100.0 / (1.0 + rs)
}
