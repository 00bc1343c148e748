//! Error types for the XRP price tracker

use thiserror::Error;

/// Errors that can occur when a single provider fetches the asset
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request deadline elapsed before a response arrived
    #[error("Request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Transport-level failure (DNS, connect, TLS, body read)
    #[error("Network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Provider answered with a non-success status
    #[error("API error: {status} {status_text}")]
    Http { status: u16, status_text: String },

    /// Response body did not have the expected shape
    #[error("{0}")]
    Validation(String),
}

impl ProviderError {
    /// Wraps a transport error
    pub fn network(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Network(Box::new(err))
    }

    /// Creates a Validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        Self::network(err)
    }
}

/// Errors surfaced past the provider chain
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// Every provider in the chain failed; reasons are in attempt order
    #[error("All APIs failed: {}", .reasons.join(", "))]
    AllProvidersFailed { reasons: Vec<String> },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PriceError {
    /// Creates an Internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Provider-tagged failure reasons, empty for non-chain errors
    pub fn reasons(&self) -> &[String] {
        match self {
            Self::AllProvidersFailed { reasons } => reasons,
            Self::Internal(_) => &[],
        }
    }
}
