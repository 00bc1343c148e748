//! CoinGecko provider implementation (primary)

use crate::{
    constants::{COINGECKO_API_URL, COINGECKO_COIN_ID, COINGECKO_COIN_QUERY},
    error::ProviderError,
    fetcher::{ReqwestTransport, TimeoutFetcher},
    normalize,
    provider::AssetProvider,
    types::CanonicalAsset,
};
use async_trait::async_trait;
use std::sync::Arc;

/// CoinGecko `/coins/ripple` provider
///
/// The endpoint returns a large coin document; only `market_data` and
/// `market_cap_rank` are used.
pub struct CoinGeckoProvider {
    fetcher: TimeoutFetcher,
}

impl CoinGeckoProvider {
    /// Creates a new CoinGecko provider over its own HTTP client
    pub fn new() -> Result<Self, ProviderError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_fetcher(TimeoutFetcher::new(transport)))
    }

    /// Creates a provider over an existing fetcher
    pub fn with_fetcher(fetcher: TimeoutFetcher) -> Self {
        Self { fetcher }
    }

    fn build_url(&self) -> String {
        format!(
            "{}/coins/{}?{}",
            COINGECKO_API_URL, COINGECKO_COIN_ID, COINGECKO_COIN_QUERY
        )
    }
}

#[async_trait]
impl AssetProvider for CoinGeckoProvider {
    async fn fetch_asset(&self) -> Result<CanonicalAsset, ProviderError> {
        let url = self.build_url();
        tracing::debug!(url = %url, "Fetching XRP price from CoinGecko");

        let response = self.fetcher.fetch(&url).await?;

        if !response.is_success() {
            return Err(ProviderError::Http {
                status: response.status,
                status_text: response.status_text,
            });
        }

        let asset = normalize::from_coingecko(&response.body)?;

        tracing::debug!(
            price = %asset.price_usd,
            supply = %asset.supply,
            market_cap = %asset.market_cap_usd,
            "Fetched XRP data from CoinGecko"
        );

        Ok(asset)
    }

    fn provider_name(&self) -> &'static str {
        "CoinGecko"
    }
}
