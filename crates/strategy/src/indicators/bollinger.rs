use serde::Serialize;

use super::sma::{sma, stddev};

/// Bollinger Bands, aligned with the input prices. Warm-up positions are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BollingerBands {
    pub upper: Vec<Option<f64>>,
    pub middle: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
}

impl BollingerBands {
    pub fn compute(prices: &[f64], period: usize, multiplier: f64) -> Self {
        let middle = sma(prices, period);
        let sd = stddev(prices, period);

        let band = |sign: f64| -> Vec<Option<f64>> {
            middle
                .iter()
                .zip(&sd)
                .map(|(m, s)| Some((*m)? + sign * multiplier * (*s)?))
                .collect()
        };
        let upper = band(1.0);
        let lower = band(-1.0);

        Self { upper, middle, lower }
    }

    pub fn len(&self) -> usize {
        self.middle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middle.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bands_surround_middle() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + (i as f64 * 0.7).sin() * 3.0).collect();
        let bb = BollingerBands::compute(&prices, 20, 2.0);
        assert_eq!(bb.len(), 30);
        assert!(bb.upper[18].is_none());
        for i in 19..30 {
            let (u, m, l) = (bb.upper[i].unwrap(), bb.middle[i].unwrap(), bb.lower[i].unwrap());
            assert!(u >= m && m >= l);
        }
    }

    #[test]
    fn flat_prices_collapse_bands() {
        let bb = BollingerBands::compute(&[10.0; 5], 3, 2.0);
        assert_eq!(bb.upper[4], Some(10.0));
        assert_eq!(bb.lower[4], Some(10.0));
    }
}
