//! CoinCap provider implementation (secondary)

use crate::{
    constants::{COINCAP_API_URL, COINCAP_ASSET_ID},
    error::ProviderError,
    fetcher::{ReqwestTransport, TimeoutFetcher},
    normalize,
    provider::AssetProvider,
    types::CanonicalAsset,
};
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;

/// CoinCap `/assets/xrp` provider
pub struct CoinCapProvider {
    fetcher: TimeoutFetcher,
}

impl CoinCapProvider {
    /// Creates a new CoinCap provider over its own HTTP client
    pub fn new() -> Result<Self, ProviderError> {
        let transport = Arc::new(ReqwestTransport::new()?);
        Ok(Self::with_fetcher(TimeoutFetcher::new(transport)))
    }

    /// Creates a provider over an existing fetcher
    pub fn with_fetcher(fetcher: TimeoutFetcher) -> Self {
        Self { fetcher }
    }

    /// Builds the asset URL with a cache-busting millisecond timestamp
    fn build_url(&self) -> String {
        format!(
            "{}/assets/{}?t={}",
            COINCAP_API_URL,
            COINCAP_ASSET_ID,
            Utc::now().timestamp_millis()
        )
    }
}

#[async_trait]
impl AssetProvider for CoinCapProvider {
    async fn fetch_asset(&self) -> Result<CanonicalAsset, ProviderError> {
        let url = self.build_url();
        tracing::debug!(url = %url, "Fetching XRP price from CoinCap");

        let response = self.fetcher.fetch(&url).await?;

        if !response.is_success() {
            return Err(ProviderError::Http {
                status: response.status,
                status_text: response.status_text,
            });
        }

        let asset = normalize::from_coincap(&response.body)?;

        tracing::debug!(
            price = %asset.price_usd,
            supply = %asset.supply,
            market_cap = %asset.market_cap_usd,
            "Fetched XRP data from CoinCap"
        );

        Ok(asset)
    }

    fn provider_name(&self) -> &'static str {
        "CoinCap"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::mock::MockTransport;

    fn provider(transport: &Arc<MockTransport>) -> CoinCapProvider {
        CoinCapProvider::with_fetcher(TimeoutFetcher::new(transport.clone()))
    }

    #[tokio::test]
    async fn url_carries_cache_busting_timestamp() {
        let transport = Arc::new(MockTransport::json(
            200,
            r#"{"data": {"id": "xrp", "priceUsd": "0.5238"}, "timestamp": 1}"#,
        ));

        let asset = provider(&transport).fetch_asset().await.unwrap();
        assert_eq!(asset.price_usd, "0.5238");

        let url = &transport.urls()[0];
        let (base, stamp) = url.split_once("?t=").unwrap();
        assert_eq!(base, "https://api.coincap.io/v2/assets/xrp");
        assert!(stamp.parse::<i64>().unwrap() > 0);
    }

    #[tokio::test]
    async fn error_status_is_checked_before_parsing() {
        let transport = Arc::new(MockTransport::json(502, "<html>bad gateway</html>"));

        let err = provider(&transport).fetch_asset().await.unwrap_err();

        assert_eq!(err.to_string(), "API error: 502 Bad Gateway");
    }

    #[tokio::test]
    async fn numeric_price_is_rejected() {
        let transport = Arc::new(MockTransport::json(200, r#"{"data": {"priceUsd": 0.52}}"#));

        let err = provider(&transport).fetch_asset().await.unwrap_err();

        assert!(matches!(err, ProviderError::Validation(_)));
    }
}
