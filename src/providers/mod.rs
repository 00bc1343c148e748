//! Asset provider implementations

pub mod coincap;
pub mod coingecko;
pub mod failover;

pub use coincap::CoinCapProvider;
pub use coingecko::CoinGeckoProvider;
pub use failover::ProviderChain;
