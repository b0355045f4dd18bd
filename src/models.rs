use serde::Serialize;

const DEFAULT_HYPERLIQUID_URL: &str = "https://api.hyperliquid.xyz/info";
const DEFAULT_LIGHTER_URL: &str = "https://api.lighter.xyz/v1/public";

/// Normalized view of one venue's market data for a single perpetual market.
///
/// A snapshot always carries a funding rate; the mid price is advisory and may
/// be absent when the venue's book-derived price cannot be determined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketSnapshot {
    /// Signed funding rate per funding period (a fraction, not a percentage).
    pub funding_rate: f64,
    /// Mid or mark price in quote currency, when the venue provides one.
    pub mid_price: Option<f64>,
}

impl MarketSnapshot {
    pub fn new(funding_rate: f64) -> Self {
        Self {
            funding_rate,
            mid_price: None,
        }
    }

    pub fn with_mid(mut self, mid_price: Option<f64>) -> Self {
        self.mid_price = mid_price;
        self
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub hyperliquid_url: String,
    pub lighter_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        let hyperliquid_url = std::env::var("HYPERLIQUID_API_URL")
            .unwrap_or_else(|_| DEFAULT_HYPERLIQUID_URL.to_string());

        let lighter_url =
            std::env::var("LIGHTER_API_URL").unwrap_or_else(|_| DEFAULT_LIGHTER_URL.to_string());

        Self {
            hyperliquid_url,
            lighter_url,
        }
    }
}
