//! Constants for the XRP price tracker
//!
//! All configuration is centralized here. The only runtime knob is the
//! `XRP_PRICE_PROVIDER` environment variable read by
//! [`ProviderChain::from_env`](crate::providers::ProviderChain::from_env);
//! scheduler timing can be overridden per instance with a
//! [`RefreshPolicy`](crate::scheduler::RefreshPolicy).

/// How often the scheduler polls the providers (in seconds)
pub const REFRESH_INTERVAL_SECS: u64 = 30;

/// Age after which data is eligible for background revalidation (in seconds)
pub const STALE_TIME_SECS: u64 = 15;

/// Default deadline for a single HTTP request (in milliseconds)
pub const REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Retries after the first failed scheduler-driven attempt
pub const MAX_RETRIES: u32 = 2;

/// Backoff before the first retry (in milliseconds)
pub const INITIAL_BACKOFF_MS: u64 = 1000;

/// Upper bound for the retry backoff (in milliseconds)
pub const MAX_BACKOFF_MS: u64 = 5000;

/// Environment variable selecting which providers the default chain uses
pub const PROVIDER_ENV_VAR: &str = "XRP_PRICE_PROVIDER";

/// Fixed request headers sent with every provider call
pub const REQUEST_HEADERS: &[(&str, &str)] = &[
    ("Accept", "application/json"),
    ("Content-Type", "application/json"),
    ("Cache-Control", "no-cache"),
];

/// User agent for HTTP requests
pub const USER_AGENT: &str = "xrp-price-tracker/0.1.0";

/// Canonical identity of the tracked asset
pub const ASSET_ID: &str = "xrp";
pub const ASSET_SYMBOL: &str = "XRP";
pub const ASSET_NAME: &str = "XRP";

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// CoinGecko coin id for XRP
pub const COINGECKO_COIN_ID: &str = "ripple";

/// Query string restricting the CoinGecko coin endpoint to market data
pub const COINGECKO_COIN_QUERY: &str = "localization=false&tickers=false&market_data=true&community_data=false&developer_data=false&sparkline=false";

/// CoinCap API base URL
pub const COINCAP_API_URL: &str = "https://api.coincap.io/v2";

/// CoinCap asset id for XRP
pub const COINCAP_ASSET_ID: &str = "xrp";

/// Rank reported when CoinGecko omits `market_cap_rank`.
///
/// This is XRP's market rank when the value was chosen. It only makes sense
/// because the tracked asset is hardcoded; it is not a general default.
pub const COINGECKO_FALLBACK_RANK: &str = "7";

/// XRP's protocol-level supply cap, used when CoinGecko omits `max_supply`
pub const XRP_MAX_SUPPLY: &str = "100000000000";
