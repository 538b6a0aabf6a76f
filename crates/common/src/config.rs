use std::collections::HashMap;
use std::time::Duration;

use crate::ProviderKind;

/// All configuration loaded from environment variables at startup.
/// Every variable is optional; malformed values cause an immediate panic
/// with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    // HTTP
    pub port: u16,

    // Sources, in cascade priority order
    pub provider_order: Vec<ProviderKind>,
    /// Overrides every provider's default per-attempt timeout.
    pub provider_timeout: Option<Duration>,
    /// Endpoint overrides keyed by provider (mirrors, local mocks).
    pub base_urls: HashMap<ProviderKind, String>,

    // Optional TOML file with signal detector parameters
    pub signal_config_path: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            provider_order: ProviderKind::ALL.to_vec(),
            provider_timeout: None,
            base_urls: HashMap::new(),
            signal_config_path: None,
        }
    }
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let port = lookup("PORT")
            .map(|v| {
                v.trim()
                    .parse::<u16>()
                    .unwrap_or_else(|_| panic!("PORT must be a valid port number, got: '{v}'"))
            })
            .unwrap_or(defaults.port);

        let provider_order = lookup("PROVIDER_ORDER")
            .map(|v| parse_provider_order(&v))
            .unwrap_or(defaults.provider_order);

        let provider_timeout = lookup("PROVIDER_TIMEOUT_SECS").map(|v| {
            let secs = v.trim().parse::<u64>().unwrap_or_else(|_| {
                panic!("PROVIDER_TIMEOUT_SECS must be a whole number of seconds, got: '{v}'")
            });
            Duration::from_secs(secs)
        });

        let base_urls = ProviderKind::ALL
            .into_iter()
            .filter_map(|kind| {
                lookup(&base_url_var(kind)).map(|url| (kind, url.trim_end_matches('/').to_string()))
            })
            .collect();

        Config {
            port,
            provider_order,
            provider_timeout,
            base_urls,
            signal_config_path: lookup("SIGNAL_CONFIG_PATH").filter(|v| !v.trim().is_empty()),
        }
    }

    /// Effective per-attempt timeout for a provider.
    pub fn timeout_for(&self, kind: ProviderKind) -> Duration {
        self.provider_timeout.unwrap_or_else(|| kind.default_timeout())
    }

    pub fn base_url_for(&self, kind: ProviderKind) -> Option<&str> {
        self.base_urls.get(&kind).map(String::as_str)
    }
}

/// `binance_us` → `BINANCE_US_BASE_URL`.
fn base_url_var(kind: ProviderKind) -> String {
    format!("{}_BASE_URL", kind.id().to_uppercase())
}

fn parse_provider_order(raw: &str) -> Vec<ProviderKind> {
    let mut order: Vec<ProviderKind> = Vec::new();
    for token in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let kind = token
            .parse::<ProviderKind>()
            .unwrap_or_else(|e| panic!("PROVIDER_ORDER: {e}"));
        if !order.contains(&kind) {
            order.push(kind);
        }
    }
    if order.is_empty() {
        panic!("PROVIDER_ORDER must name at least one provider");
    }
    order
}
