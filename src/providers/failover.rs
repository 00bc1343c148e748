//! Fixed-order provider chain

use crate::{
    constants::PROVIDER_ENV_VAR,
    error::{PriceError, ProviderError},
    fetcher::{ReqwestTransport, TimeoutFetcher},
    provider::AssetProvider,
    providers::{CoinCapProvider, CoinGeckoProvider},
    types::{AssetResponse, FetchOutcome},
};
use std::sync::Arc;

/// Tries each provider once, in order, until one succeeds
///
/// Failures are collected as `"<provider>: <message>"` and returned together
/// in [`PriceError::AllProvidersFailed`] when every provider fails. There is
/// no retry within a provider and no reordering between calls.
pub struct ProviderChain {
    providers: Vec<Arc<dyn AssetProvider>>,
}

impl ProviderChain {
    /// Creates the default chain: CoinGecko, then CoinCap, over one shared client
    pub fn new() -> Result<Self, ProviderError> {
        let fetcher = Self::default_fetcher()?;

        Ok(Self::with_providers(vec![
            Arc::new(CoinGeckoProvider::with_fetcher(fetcher.clone())),
            Arc::new(CoinCapProvider::with_fetcher(fetcher)),
        ]))
    }

    /// Creates the chain selected by the `XRP_PRICE_PROVIDER` environment variable
    ///
    /// `coingecko` or `coincap` restricts the chain to that provider; anything
    /// else uses the default fallback order.
    pub fn from_env() -> Result<Self, ProviderError> {
        let selection = std::env::var(PROVIDER_ENV_VAR).unwrap_or_default();

        let chain = match selection.to_lowercase().as_str() {
            "coingecko" => Self::single(CoinGeckoProvider::with_fetcher(Self::default_fetcher()?)),
            "coincap" => Self::single(CoinCapProvider::with_fetcher(Self::default_fetcher()?)),
            _ => Self::new()?,
        };

        tracing::info!(providers = ?chain.provider_names(), "Configured XRP price providers");

        Ok(chain)
    }

    /// Creates a chain over the given providers, tried in the order given
    pub fn with_providers(providers: Vec<Arc<dyn AssetProvider>>) -> Self {
        Self { providers }
    }

    fn single(provider: impl AssetProvider + 'static) -> Self {
        Self::with_providers(vec![Arc::new(provider)])
    }

    fn default_fetcher() -> Result<TimeoutFetcher, ProviderError> {
        Ok(TimeoutFetcher::new(Arc::new(ReqwestTransport::new()?)))
    }

    /// Names of the providers in attempt order
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.provider_name()).collect()
    }

    /// Fetches the asset from the first provider that succeeds
    pub async fn fetch_asset(&self) -> FetchOutcome {
        let mut reasons = Vec::with_capacity(self.providers.len());

        for provider in &self.providers {
            let name = provider.provider_name();
            tracing::debug!(provider = name, "Fetching XRP price");

            match provider.fetch_asset().await {
                Ok(asset) => {
                    tracing::info!(provider = name, price = %asset.price_usd, "Fetched XRP price");
                    return Ok(asset);
                }
                Err(e) => {
                    tracing::warn!(provider = name, error = %e, "Provider failed to fetch XRP price");
                    reasons.push(format!("{}: {}", name, e));
                }
            }
        }

        Err(PriceError::AllProvidersFailed { reasons })
    }

    /// Same as [`fetch_asset`](Self::fetch_asset), wrapped in the `{ data }` envelope
    pub async fn fetch_xrp_price(&self) -> Result<AssetResponse, PriceError> {
        self.fetch_asset().await.map(|data| AssetResponse { data })
    }
}
