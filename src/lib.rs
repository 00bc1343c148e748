//! # XRP Price Tracker
//!
//! Price-retrieval core for a single-asset (XRP) price tracker screen.
//!
//! Prices come from CoinGecko, falling back to CoinCap when CoinGecko fails.
//! Every request runs under a hard deadline. Responses from both providers are
//! normalized into one [`CanonicalAsset`] shape.
//!
//! ## One-shot fetch
//!
//! ```no_run
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let response = xrp_price_tracker::fetch_xrp_price().await?;
//! println!("XRP: {}", xrp_price_tracker::format::format_currency(Some(response.data.price_usd.as_str()), false));
//! # Ok(())
//! # }
//! ```
//!
//! ## Polling
//!
//! [`RefreshScheduler`] polls every 30 seconds, retries with backoff, and keeps
//! the last good value visible when the providers are down:
//!
//! ```no_run
//! use std::sync::Arc;
//! use xrp_price_tracker::{PriceView, ProviderChain, RefreshScheduler};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scheduler = Arc::new(RefreshScheduler::new(ProviderChain::from_env()?));
//! let _poller = scheduler.start();
//!
//! let mut updates = scheduler.subscribe();
//! while updates.changed().await.is_ok() {
//!     match updates.borrow_and_update().view() {
//!         PriceView::Loading => println!("loading..."),
//!         PriceView::Unavailable { error } => println!("unavailable: {}", error),
//!         PriceView::Live { asset } => println!("XRP ${}", asset.price_usd),
//!         PriceView::Stale { asset, error } => println!("XRP ${} (stale: {})", asset.price_usd, error),
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! Settings are compile-time constants in [`constants`]. The
//! `XRP_PRICE_PROVIDER` environment variable (`coingecko` or `coincap`)
//! restricts the default chain to one provider.

pub mod constants;
pub mod error;
pub mod fetcher;
pub mod format;
pub mod normalize;
pub mod provider;
pub mod providers;
pub mod scheduler;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{PriceError, ProviderError};
pub use fetcher::{HttpTransport, RawResponse, ReqwestTransport, TimeoutFetcher};
pub use format::{format_currency, format_percentage, format_supply, FormattedAsset};
pub use provider::AssetProvider;
pub use providers::{CoinCapProvider, CoinGeckoProvider, ProviderChain};
pub use scheduler::{RefreshPolicy, RefreshScheduler};
pub use store::{FetchStatus, PriceSnapshot, PriceView};
pub use types::{AssetResponse, CanonicalAsset, FetchOutcome};

use std::sync::Arc;
use tokio::sync::OnceCell;

static GLOBAL_CHAIN: OnceCell<Arc<ProviderChain>> = OnceCell::const_new();

/// Fetches the current XRP snapshot through the default provider chain
///
/// The chain is built on first use from the environment (see
/// [`ProviderChain::from_env`]) and shared afterwards.
pub async fn fetch_xrp_price() -> Result<AssetResponse, PriceError> {
    let chain = GLOBAL_CHAIN
        .get_or_try_init(|| async { ProviderChain::from_env().map(Arc::new) })
        .await
        .map_err(|e| PriceError::internal(format!("failed to build HTTP client: {e}")))?;

    chain.fetch_xrp_price().await
}
