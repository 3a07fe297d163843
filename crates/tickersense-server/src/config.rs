//! Static configuration: environment variables plus the compiled-in ticker
//! list and store descriptor.

use std::env;

use tickersense_core::Ticker;

/// Assets the analysis cycle tracks: exchange-suffixed equities and
/// quote-currency-suffixed cryptocurrency pairs. Not mutable at runtime.
const TRACKED_TICKERS: &[&str] = &[
    "BBCA.JK",
    "BBRI.JK",
    "BMRI.JK",
    "TLKM.JK",
    "ASII.JK",
    "GOTO.JK",
    "BTC-USD",
    "ETH-USD",
    "SOL-USD",
];

pub const DEFAULT_STORE_URL: &str = "https://tickersense-default-rtdb.firebaseio.com";
pub const DEFAULT_PORT: u16 = 3000;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub store_url: String,
    pub keepalive_url: Option<String>,
    pub tickers: Vec<Ticker>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: String::from("0.0.0.0"),
            port: DEFAULT_PORT,
            gemini_api_key: None,
            store_url: String::from(DEFAULT_STORE_URL),
            keepalive_url: None,
            tickers: tracked_tickers(),
        }
    }
}

impl ServerConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let host = env::var("TICKERSENSE_HOST").unwrap_or_else(|_| String::from("0.0.0.0"));

        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        let store_url =
            env::var("TICKERSENSE_STORE_URL").unwrap_or_else(|_| String::from(DEFAULT_STORE_URL));

        let keepalive_url = env::var("TICKERSENSE_KEEPALIVE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Self {
            host,
            port,
            gemini_api_key,
            store_url,
            keepalive_url,
            tickers: tracked_tickers(),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn tracked_tickers() -> Vec<Ticker> {
    TRACKED_TICKERS
        .iter()
        .map(|raw| Ticker::parse(raw).expect("tracked tickers are valid"))
        .collect()
}
