use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Logical candle width accepted by the public API.
///
/// Variants are declared from finest to coarsest so `Ord` follows bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    M1,
    #[serde(rename = "5m")]
    M5,
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "30m")]
    M30,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "4h")]
    H4,
    #[serde(rename = "1d")]
    D1,
}

impl Interval {
    pub const ALL: [Interval; 7] = [
        Interval::M1,
        Interval::M5,
        Interval::M15,
        Interval::M30,
        Interval::H1,
        Interval::H4,
        Interval::D1,
    ];

    /// Used whenever a caller sends an interval we do not recognise.
    pub const DEFAULT: Interval = Interval::M15;

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::M1 => "1m",
            Interval::M5 => "5m",
            Interval::M15 => "15m",
            Interval::M30 => "30m",
            Interval::H1 => "1h",
            Interval::H4 => "4h",
            Interval::D1 => "1d",
        }
    }

    /// Bucket width in seconds.
    pub fn seconds(&self) -> i64 {
        match self {
            Interval::M1 => 60,
            Interval::M5 => 5 * 60,
            Interval::M15 => 15 * 60,
            Interval::M30 => 30 * 60,
            Interval::H1 => 60 * 60,
            Interval::H4 => 4 * 60 * 60,
            Interval::D1 => 24 * 60 * 60,
        }
    }

    /// Parse an interval, falling back to [`Interval::DEFAULT`] for anything unknown.
    pub fn parse_or_default(s: &str) -> Interval {
        s.parse().unwrap_or(Interval::DEFAULT)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s.trim())
            .ok_or_else(|| format!("unknown interval '{s}'"))
    }
}

/// The closed set of upstream market data sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Binance,
    BinanceUs,
    #[serde(rename = "coingecko")]
    CoinGecko,
    #[serde(rename = "coincap")]
    CoinCap,
    Yahoo,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Binance,
        ProviderKind::BinanceUs,
        ProviderKind::CoinGecko,
        ProviderKind::CoinCap,
        ProviderKind::Yahoo,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            ProviderKind::Binance => "binance",
            ProviderKind::BinanceUs => "binance_us",
            ProviderKind::CoinGecko => "coingecko",
            ProviderKind::CoinCap => "coincap",
            ProviderKind::Yahoo => "yahoo",
        }
    }

    /// Per-attempt budget used by the resolver unless overridden in config.
    pub fn default_timeout(&self) -> Duration {
        match self {
            ProviderKind::Binance | ProviderKind::BinanceUs => Duration::from_secs(5),
            ProviderKind::CoinGecko | ProviderKind::CoinCap => Duration::from_secs(10),
            ProviderKind::Yahoo => Duration::from_secs(15),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|p| p.id() == needle)
            .ok_or_else(|| format!("unknown provider '{s}'"))
    }
}

/// One fixed-width OHLCV bucket. `time` is the bucket start in UTC seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Zero when the provider has no volume data.
    pub volume: f64,
}

impl Candle {
    /// A zero-range candle built from a single price point.
    pub fn flat(time: i64, price: f64, volume: f64) -> Self {
        Self {
            time,
            open: price,
            high: price,
            low: price,
            close: price,
            volume,
        }
    }
}

/// A normalized, time-ordered candle series plus where it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandleSeries {
    pub symbol: String,
    pub requested_interval: Interval,
    /// The bucket width actually delivered. May be coarser than requested.
    pub interval: Interval,
    pub provider: ProviderKind,
    /// Set when the delivered interval differs from the requested one.
    pub note: Option<String>,
    pub candles: Vec<Candle>,
}

impl CandleSeries {
    pub fn is_substituted(&self) -> bool {
        self.interval != self.requested_interval
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}

/// Current price snapshot for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    /// Percent change over the provider's window (24h for every current source).
    pub change_pct: f64,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<f64>,
    pub provider: ProviderKind,
    pub fetched_at: DateTime<Utc>,
}

/// Direction of a detected trade signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Long,
    Short,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Long => write!(f, "LONG"),
            Direction::Short => write!(f, "SHORT"),
        }
    }
}

/// Indicator values at the moment a signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub rsi: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
}

/// A point-in-time trade recommendation emitted by the signal detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub direction: Direction,
    /// Position of the triggering candle within its series.
    pub index: usize,
    pub time: i64,
    pub entry: f64,
    pub take_profit: f64,
    pub stop_loss: f64,
    /// Additive confidence score, 0–100.
    pub strength: u8,
    pub reasons: Vec<String>,
    pub snapshot: IndicatorSnapshot,
}
