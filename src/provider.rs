//! Provider abstraction for fetching the tracked asset from external APIs

use crate::{error::ProviderError, types::CanonicalAsset};
use async_trait::async_trait;

/// Trait for asset data providers
///
/// Each implementation calls one upstream API and normalizes its response
/// into a [`CanonicalAsset`]. Providers make exactly one attempt per call;
/// retries and fallback are the caller's concern.
#[async_trait]
pub trait AssetProvider: Send + Sync {
    /// Fetches and normalizes the current asset snapshot
    async fn fetch_asset(&self) -> Result<CanonicalAsset, ProviderError>;

    /// Returns the name of this provider, used to tag failure reasons
    fn provider_name(&self) -> &'static str;
}
