/// Simple moving average. `None` until the window is full (`period - 1`
/// leading entries).
pub fn sma(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(prices, period, |window| mean(window))
}

/// Population standard deviation over the same trailing window as [`sma`].
pub fn stddev(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    rolling(prices, period, |window| {
        let m = mean(window);
        let var = window.iter().map(|p| (p - m).powi(2)).sum::<f64>() / window.len() as f64;
        var.sqrt()
    })
}

fn mean(window: &[f64]) -> f64 {
    window.iter().sum::<f64>() / window.len() as f64
}

fn rolling(prices: &[f64], period: usize, f: impl Fn(&[f64]) -> f64) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; prices.len()];
    }
    (0..prices.len())
        .map(|i| (i + 1 >= period).then(|| f(&prices[i + 1 - period..=i])))
        .collect()
}
