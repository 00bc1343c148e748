//! Types for the XRP price tracker

use crate::error::PriceError;
use serde::{Deserialize, Serialize};

/// Unified asset record every provider is normalized into
///
/// Numeric quantities are kept as decimal strings so the record can be passed
/// through unchanged from providers that already speak this shape. Every
/// numeric field parses as a finite `f64`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalAsset {
    pub id: String,
    pub rank: String,
    pub symbol: String,
    pub name: String,
    pub supply: String,
    /// `None` when the asset has no supply cap
    pub max_supply: Option<String>,
    pub market_cap_usd: String,
    #[serde(rename = "volumeUsd24Hr")]
    pub volume_usd_24_hr: String,
    pub price_usd: String,
    #[serde(rename = "changePercent24Hr")]
    pub change_percent_24_hr: String,
    #[serde(rename = "vwap24Hr")]
    pub vwap_24_hr: String,
}

impl CanonicalAsset {
    /// Price in USD as a number
    pub fn price(&self) -> f64 {
        self.price_usd.parse().unwrap_or(0.0)
    }

    /// 24h change percentage as a number
    pub fn change_percent(&self) -> f64 {
        self.change_percent_24_hr.parse().unwrap_or(0.0)
    }

    /// True when the 24h change is zero or positive
    pub fn is_change_positive(&self) -> bool {
        self.change_percent() >= 0.0
    }
}

/// Envelope returned by the public fetch entry point
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetResponse {
    pub data: CanonicalAsset,
}

/// Result of one provider-chain invocation
pub type FetchOutcome = Result<CanonicalAsset, PriceError>;

#[cfg(test)]
pub(crate) fn sample_asset(price_usd: &str) -> CanonicalAsset {
    CanonicalAsset {
        id: "xrp".to_string(),
        rank: "7".to_string(),
        symbol: "XRP".to_string(),
        name: "XRP".to_string(),
        supply: "45000000000".to_string(),
        max_supply: Some("100000000000".to_string()),
        market_cap_usd: "23500000000".to_string(),
        volume_usd_24_hr: "1200000000".to_string(),
        price_usd: price_usd.to_string(),
        change_percent_24_hr: "-3.456".to_string(),
        vwap_24_hr: price_usd.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_canonical_field_names() {
        let json = serde_json::to_value(sample_asset("0.5234")).unwrap();

        for key in [
            "id",
            "rank",
            "symbol",
            "name",
            "supply",
            "maxSupply",
            "marketCapUsd",
            "volumeUsd24Hr",
            "priceUsd",
            "changePercent24Hr",
            "vwap24Hr",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn numeric_accessors_parse_fields() {
        let asset = sample_asset("0.5234");
        assert_eq!(asset.price(), 0.5234);
        assert!(!asset.is_change_positive());
    }
}
