//! Maps provider response bodies into [`CanonicalAsset`]
//!
//! Upstream fields may be missing, null, numbers, or numeric strings. Anything
//! that does not yield a finite number falls back to the documented default,
//! so every numeric field of the output parses as a finite `f64`.

use crate::{
    constants::{ASSET_ID, ASSET_NAME, ASSET_SYMBOL, COINGECKO_FALLBACK_RANK, XRP_MAX_SUPPLY},
    error::ProviderError,
    types::CanonicalAsset,
};
use serde_json::Value;

const ZERO: &str = "0";

/// Normalizes a CoinGecko `/coins/{id}` body
///
/// Requires a `market_data` object. `vwap_24_hr` mirrors the current price
/// because CoinGecko publishes no VWAP.
pub fn from_coingecko(body: &str) -> Result<CanonicalAsset, ProviderError> {
    let root = parse_body(body, "CoinGecko")?;

    let market = root
        .get("market_data")
        .filter(|v| v.is_object())
        .ok_or_else(|| ProviderError::validation("Invalid CoinGecko response: missing market data"))?;

    let usd = |field: &str| market.get(field).and_then(|v| v.get("usd"));
    let price = decimal(usd("current_price")).unwrap_or_else(|| ZERO.to_string());

    Ok(CanonicalAsset {
        id: ASSET_ID.to_string(),
        rank: integer(root.get("market_cap_rank"))
            .unwrap_or_else(|| COINGECKO_FALLBACK_RANK.to_string()),
        symbol: ASSET_SYMBOL.to_string(),
        name: ASSET_NAME.to_string(),
        supply: decimal(market.get("circulating_supply")).unwrap_or_else(|| ZERO.to_string()),
        max_supply: Some(
            decimal(market.get("max_supply")).unwrap_or_else(|| XRP_MAX_SUPPLY.to_string()),
        ),
        market_cap_usd: decimal(usd("market_cap")).unwrap_or_else(|| ZERO.to_string()),
        volume_usd_24_hr: decimal(usd("total_volume")).unwrap_or_else(|| ZERO.to_string()),
        change_percent_24_hr: decimal(market.get("price_change_percentage_24h"))
            .unwrap_or_else(|| ZERO.to_string()),
        vwap_24_hr: price.clone(),
        price_usd: price,
    })
}

/// Normalizes a CoinCap `/assets/{id}` body
///
/// The payload already has the canonical shape under `data`; `priceUsd` must
/// be a numeric string. Other fields pass through when they are well formed.
pub fn from_coincap(body: &str) -> Result<CanonicalAsset, ProviderError> {
    let root = parse_body(body, "CoinCap")?;

    let data = root
        .get("data")
        .filter(|v| v.is_object())
        .ok_or_else(|| ProviderError::validation("Invalid CoinCap response: missing price data"))?;

    let price = match data.get("priceUsd") {
        Some(Value::String(s)) => finite(s)
            .map(|_| s.trim().to_string())
            .ok_or_else(|| {
                ProviderError::validation(format!(
                    "Invalid CoinCap response: non-numeric priceUsd {s:?}"
                ))
            })?,
        _ => {
            return Err(ProviderError::validation(
                "Invalid CoinCap response: missing price data",
            ))
        }
    };

    let text = |field: &str, default: &str| {
        data.get(field)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(default)
            .to_string()
    };
    let number = |field: &str| decimal(data.get(field)).unwrap_or_else(|| ZERO.to_string());

    Ok(CanonicalAsset {
        id: text("id", ASSET_ID),
        rank: integer(data.get("rank")).unwrap_or_else(|| ZERO.to_string()),
        symbol: text("symbol", ASSET_SYMBOL),
        name: text("name", ASSET_NAME),
        supply: number("supply"),
        max_supply: decimal(data.get("maxSupply")),
        market_cap_usd: number("marketCapUsd"),
        volume_usd_24_hr: number("volumeUsd24Hr"),
        price_usd: price,
        change_percent_24_hr: number("changePercent24Hr"),
        vwap_24_hr: number("vwap24Hr"),
    })
}

fn parse_body(body: &str, provider: &str) -> Result<Value, ProviderError> {
    serde_json::from_str(body).map_err(|e| {
        ProviderError::validation(format!("Invalid {provider} response: {e}"))
    })
}

/// Renders a JSON number or numeric string as a decimal string
fn decimal(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()).map(|f| f.to_string()),
        Value::String(s) => finite(s).map(|_| s.trim().to_string()),
        _ => None,
    }
}

/// Like [`decimal`], but truncates to a whole number
fn integer(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Number(n) => match n.as_u64() {
            Some(u) => Some(u.to_string()),
            None => n
                .as_f64()
                .filter(|f| f.is_finite())
                .map(|f| (f.trunc() as i64).to_string()),
        },
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .ok()
            .map(|u| u.to_string()),
        _ => None,
    }
}

fn finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}
