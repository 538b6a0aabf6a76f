/// Exponential moving average over `prices` (oldest first).
///
/// Seeded with the simple mean of the first `min(period, len)` prices, so the
/// output has the same length as the input with no warm-up gap.
pub fn ema(prices: &[f64], period: usize) -> Vec<f64> {
    if prices.is_empty() || period == 0 {
        return Vec::new();
    }

    let seed_len = period.min(prices.len());
    let seed = prices[..seed_len].iter().sum::<f64>() / seed_len as f64;
    let k = 2.0 / (period as f64 + 1.0);

    let mut out = Vec::with_capacity(prices.len());
    out.push(seed);
    for &price in &prices[1..] {
        let prev = out[out.len() - 1];
        out.push((price - prev) * k + prev);
    }
    out
}
