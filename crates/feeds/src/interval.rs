//! Maps logical intervals onto each provider's native interval vocabulary.
//!
//! When a provider cannot produce the requested bucket width, the nearest
//! coarser width it does offer is selected and the result is flagged as a
//! substitution so callers can surface the degradation.

use common::{Interval, ProviderKind};

/// Outcome of translating a requested interval for one provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Translation {
    pub requested: Interval,
    /// The interval the provider will actually deliver.
    pub interval: Interval,
    /// Provider-native token to send upstream.
    pub native: &'static str,
}

impl Translation {
    pub fn is_exact(&self) -> bool {
        self.requested == self.interval
    }

    pub fn is_substituted(&self) -> bool {
        !self.is_exact()
    }
}

const BINANCE: &[(Interval, &str)] = &[
    (Interval::M1, "1m"),
    (Interval::M5, "5m"),
    (Interval::M15, "15m"),
    (Interval::M30, "30m"),
    (Interval::H1, "1h"),
    (Interval::H4, "4h"),
    (Interval::D1, "1d"),
];

// The OHLC endpoint picks granularity from the `days` window: 30m for one
// day, 4h for up to thirty. Anything longer yields 4-day buckets.
const COINGECKO: &[(Interval, &str)] = &[(Interval::M30, "30m"), (Interval::H4, "4h")];

const COINCAP: &[(Interval, &str)] = &[
    (Interval::M1, "m1"),
    (Interval::M5, "m5"),
    (Interval::M15, "m15"),
    (Interval::M30, "m30"),
    (Interval::H1, "h1"),
    (Interval::D1, "d1"),
];

const YAHOO: &[(Interval, &str)] = &[
    (Interval::M1, "1m"),
    (Interval::M5, "5m"),
    (Interval::M15, "15m"),
    (Interval::M30, "30m"),
    (Interval::H1, "60m"),
    (Interval::D1, "1d"),
];

/// Native intervals offered by a provider, finest first.
pub fn native_intervals(kind: ProviderKind) -> &'static [(Interval, &'static str)] {
    match kind {
        ProviderKind::Binance | ProviderKind::BinanceUs => BINANCE,
        ProviderKind::CoinGecko => COINGECKO,
        ProviderKind::CoinCap => COINCAP,
        ProviderKind::Yahoo => YAHOO,
    }
}

/// Translate `requested` for `kind`.
///
/// Returns `None` only when the provider offers nothing at least as coarse as
/// the requested width.
pub fn translate(kind: ProviderKind, requested: Interval) -> Option<Translation> {
    native_intervals(kind)
        .iter()
        .find(|(interval, _)| *interval >= requested)
        .map(|&(interval, native)| Translation {
            requested,
            interval,
            native,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binance_translates_every_interval_exactly() {
        for interval in Interval::ALL {
            for kind in [ProviderKind::Binance, ProviderKind::BinanceUs] {
                let t = translate(kind, interval).unwrap();
                assert!(t.is_exact());
                assert_eq!(t.native, interval.as_str());
            }
        }
    }

    #[test]
    fn coingecko_substitutes_coarser_buckets() {
        let t = translate(ProviderKind::CoinGecko, Interval::M5).unwrap();
        assert!(t.is_substituted());
        assert_eq!(t.interval, Interval::M30);

        let t = translate(ProviderKind::CoinGecko, Interval::H1).unwrap();
        assert_eq!(t.interval, Interval::H4);
        assert_eq!(t.native, "4h");

        assert!(translate(ProviderKind::CoinGecko, Interval::H4).unwrap().is_exact());
    }

    #[test]
    fn coingecko_has_no_daily_bucket() {
        assert!(translate(ProviderKind::CoinGecko, Interval::D1).is_none());
    }

    #[test]
    fn four_hour_requests_fall_to_daily_on_coincap_and_yahoo() {
        for kind in [ProviderKind::CoinCap, ProviderKind::Yahoo] {
            let t = translate(kind, Interval::H4).unwrap();
            assert_eq!(t.interval, Interval::D1);
            assert!(t.is_substituted());
        }
    }

    #[test]
    fn yahoo_uses_sixty_minute_token_for_hourly() {
        let t = translate(ProviderKind::Yahoo, Interval::H1).unwrap();
        assert!(t.is_exact());
        assert_eq!(t.native, "60m");
    }

    #[test]
    fn substitution_is_never_finer_than_requested() {
        for kind in ProviderKind::ALL {
            for requested in Interval::ALL {
                if let Some(t) = translate(kind, requested) {
                    assert!(t.interval >= requested, "{kind} {requested} -> {}", t.interval);
                    assert!(native_intervals(kind).iter().any(|(i, _)| *i == t.interval));
                    assert_eq!(t.is_substituted(), t.interval != requested);
                }
            }
        }
    }
}
