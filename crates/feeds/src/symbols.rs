//! Logical symbol normalization and per-provider symbol mapping.

use common::ProviderKind;

/// Quote currencies stripped from user input, longest first so `USDT`
/// wins over `USD`.
const QUOTE_SUFFIXES: [&str; 5] = ["USDT", "USDC", "BUSD", "USD", "EUR"];

/// Base asset → (CoinGecko id, CoinCap id).
const ASSET_IDS: &[(&str, &str, &str)] = &[
    ("BTC", "bitcoin", "bitcoin"),
    ("ETH", "ethereum", "ethereum"),
    ("SOL", "solana", "solana"),
    ("BNB", "binancecoin", "binance-coin"),
    ("XRP", "ripple", "xrp"),
    ("ADA", "cardano", "cardano"),
    ("DOGE", "dogecoin", "dogecoin"),
    ("DOT", "polkadot", "polkadot"),
    ("AVAX", "avalanche-2", "avalanche"),
    ("MATIC", "matic-network", "polygon"),
    ("LTC", "litecoin", "litecoin"),
    ("LINK", "chainlink", "chainlink"),
    ("TRX", "tron", "tron"),
];

/// Canonicalise user input to an upper-case base asset.
///
/// `btcusdt`, `BTC-USD`, `btc/usdt` and `btc` all become `BTC`.
pub fn normalize_symbol(input: &str) -> String {
    let upper = input.trim().to_uppercase();

    if let Some(base) = upper.split(|c: char| matches!(c, '-' | '/' | '_')).next() {
        if base.len() < upper.len() && !base.is_empty() {
            return base.to_string();
        }
    }

    for suffix in QUOTE_SUFFIXES {
        if let Some(base) = upper.strip_suffix(suffix) {
            if !base.is_empty() {
                return base.to_string();
            }
        }
    }
    upper
}

/// Provider-native spelling of a normalized base asset.
///
/// Unknown assets fall back to a heuristic: the lower-cased base for
/// aggregator ids, base plus quote currency for exchanges.
pub fn provider_symbol(kind: ProviderKind, base: &str) -> String {
    let known = ASSET_IDS.iter().find(|(b, _, _)| *b == base);
    match kind {
        ProviderKind::Binance => format!("{base}USDT"),
        ProviderKind::BinanceUs => format!("{base}USD"),
        ProviderKind::CoinGecko => known
            .map(|(_, id, _)| id.to_string())
            .unwrap_or_else(|| base.to_lowercase()),
        ProviderKind::CoinCap => known
            .map(|(_, _, id)| id.to_string())
            .unwrap_or_else(|| base.to_lowercase()),
        ProviderKind::Yahoo => format!("{base}-USD"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_common_spellings() {
        for raw in ["btc", "BTCUSDT", "btcusd", "BTC-USD", "btc/usdt", " BTC_USDC "] {
            assert_eq!(normalize_symbol(raw), "BTC", "input {raw:?}");
        }
    }

    #[test]
    fn bare_quote_currency_is_kept() {
        assert_eq!(normalize_symbol("usdt"), "USDT");
        assert_eq!(normalize_symbol("USD"), "USD");
    }

    #[test]
    fn maps_known_assets_per_provider() {
        assert_eq!(provider_symbol(ProviderKind::Binance, "ETH"), "ETHUSDT");
        assert_eq!(provider_symbol(ProviderKind::BinanceUs, "ETH"), "ETHUSD");
        assert_eq!(provider_symbol(ProviderKind::CoinGecko, "BNB"), "binancecoin");
        assert_eq!(provider_symbol(ProviderKind::CoinCap, "BNB"), "binance-coin");
        assert_eq!(provider_symbol(ProviderKind::Yahoo, "SOL"), "SOL-USD");
    }

    #[test]
    fn unknown_assets_use_heuristic() {
        assert_eq!(provider_symbol(ProviderKind::CoinGecko, "PEPE"), "pepe");
        assert_eq!(provider_symbol(ProviderKind::CoinCap, "PEPE"), "pepe");
        assert_eq!(provider_symbol(ProviderKind::Binance, "PEPE"), "PEPEUSDT");
    }
}
