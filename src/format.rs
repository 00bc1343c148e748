//! Display formatting for asset fields
//!
//! All functions take the raw numeric string (or `None`) and never fail:
//! missing or non-numeric input renders as a placeholder.

use crate::types::CanonicalAsset;

const PLACEHOLDER: &str = "-";
const ZERO_PERCENT: &str = "0.00%";

/// Formats a USD amount
///
/// With `compact`, values of at least one thousand are abbreviated
/// (`$2.50B`). Otherwise precision grows as the value shrinks: two decimals
/// from `$1`, four below `$1`, six below one cent.
pub fn format_currency(value: Option<&str>, compact: bool) -> String {
    let Some(n) = parse(value) else {
        return PLACEHOLDER.to_string();
    };

    if compact {
        if let Some((scaled, suffix)) = abbreviate(n) {
            return format!("${}{suffix}", to_fixed(scaled, 2));
        }
    }

    let digits = if n < 0.01 {
        6
    } else if n < 1.0 {
        4
    } else {
        2
    };
    format!("${}", to_fixed(n, digits))
}

/// Formats a signed percentage with two decimals (`+1.20%`, `-3.46%`)
pub fn format_percentage(value: Option<&str>) -> String {
    match parse(value) {
        Some(n) if n >= 0.0 => format!("+{}%", to_fixed(n, 2)),
        Some(n) => format!("{}%", to_fixed(n, 2)),
        None => ZERO_PERCENT.to_string(),
    }
}

/// Formats a token quantity in XRP (`45.00B XRP`)
pub fn format_supply(value: Option<&str>) -> String {
    let Some(n) = parse(value) else {
        return PLACEHOLDER.to_string();
    };

    if n >= 1e9 {
        format!("{}B XRP", to_fixed(n / 1e9, 2))
    } else if n >= 1e6 {
        format!("{}M XRP", to_fixed(n / 1e6, 2))
    } else if n >= 1e3 {
        format!("{}K XRP", to_fixed(n / 1e3, 2))
    } else {
        format!("{} XRP", group_thousands(n))
    }
}

/// Every display field of the tracker screen, pre-formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedAsset {
    /// Price with four decimals, without currency sign
    pub price: String,
    pub change_24h: String,
    pub change_is_positive: bool,
    pub market_cap: String,
    pub volume_24h: String,
    pub supply: String,
    pub max_supply: String,
    pub rank: String,
    pub vwap_24h: String,
}

impl From<&CanonicalAsset> for FormattedAsset {
    fn from(asset: &CanonicalAsset) -> Self {
        let rank = if asset.rank.is_empty() {
            PLACEHOLDER
        } else {
            asset.rank.as_str()
        };

        Self {
            price: to_fixed(asset.price(), 4),
            change_24h: format_percentage(Some(asset.change_percent_24_hr.as_str())),
            change_is_positive: asset.is_change_positive(),
            market_cap: format_currency(Some(asset.market_cap_usd.as_str()), true),
            volume_24h: format_currency(Some(asset.volume_usd_24_hr.as_str()), true),
            supply: format_supply(Some(asset.supply.as_str())),
            max_supply: format_supply(asset.max_supply.as_deref()),
            rank: format!("#{rank}"),
            vwap_24h: format_currency(Some(asset.vwap_24_hr.as_str()), false),
        }
    }
}

fn parse(value: Option<&str>) -> Option<f64> {
    value?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .map(without_negative_zero)
}

fn without_negative_zero(n: f64) -> f64 {
    if n == 0.0 {
        0.0
    } else {
        n
    }
}

/// Renders `n` with `digits` decimals, rounding exact ties away from zero
///
/// A tie at `digits` decimals is always an odd multiple of `2^-(digits + 1)`,
/// so the check is exact in binary. Everything else uses the correctly
/// rounded output of `format!`.
fn to_fixed(n: f64, digits: usize) -> String {
    let n = without_negative_zero(n);
    let halves = n * 2f64.powi(digits as i32 + 1);

    if halves.fract() == 0.0 && (halves % 2.0).abs() == 1.0 {
        let scale = 10f64.powi(digits as i32);
        let rounded = ((n.abs() * scale).ceil() / scale).copysign(n);
        return format!("{rounded:.digits$}");
    }

    format!("{n:.digits$}")
}

fn abbreviate(n: f64) -> Option<(f64, &'static str)> {
    if n >= 1e12 {
        Some((n / 1e12, "T"))
    } else if n >= 1e9 {
        Some((n / 1e9, "B"))
    } else if n >= 1e6 {
        Some((n / 1e6, "M"))
    } else if n >= 1e3 {
        Some((n / 1e3, "K"))
    } else {
        None
    }
}

/// Groups the integer part with commas and keeps up to three decimals
fn group_thousands(n: f64) -> String {
    let fixed = to_fixed(n.abs(), 3);
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if n < 0.0 && fixed != "0.000" { "-" } else { "" };

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac_part}")
    }
}
