//! Shared price cell with broadcast capabilities
//!
//! Holds the last known good asset together with loading and error flags.
//! The refresh scheduler is the only writer; readers get whole snapshots
//! through a `tokio::sync::watch` channel, so a partially applied update is
//! never observable.

use crate::{error::PriceError, types::CanonicalAsset};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Lifecycle of the most recent fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// Nothing fetched yet
    Idle,
    /// A fetch is in flight
    Loading,
    /// The last fetch succeeded
    Success,
    /// The last fetch failed after all retries
    Error,
}

/// Immutable copy of the price cell
#[derive(Debug, Clone)]
pub struct PriceSnapshot {
    /// Last successfully fetched asset, kept across failures
    pub data: Option<CanonicalAsset>,
    pub status: FetchStatus,
    /// Error of the last settled fetch, cleared on success
    pub error: Option<PriceError>,
    /// Wall-clock time `data` was fetched
    pub data_updated_at: Option<DateTime<Utc>>,
    pub error_updated_at: Option<DateTime<Utc>>,
    /// Monotonic time `data` was fetched, used for staleness
    pub fetched_at: Option<Instant>,
}

impl PriceSnapshot {
    fn empty() -> Self {
        Self {
            data: None,
            status: FetchStatus::Idle,
            error: None,
            data_updated_at: None,
            error_updated_at: None,
            fetched_at: None,
        }
    }

    /// A fetch is in flight, with or without previous data
    pub fn is_fetching(&self) -> bool {
        self.status == FetchStatus::Loading
    }

    /// A fetch is in flight and there is nothing to show yet
    pub fn is_loading(&self) -> bool {
        self.is_fetching() && self.data.is_none()
    }

    /// The last settled fetch failed
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// True when there is no data or it is older than `stale_time`
    pub fn is_stale(&self, stale_time: Duration) -> bool {
        match self.fetched_at {
            Some(at) => at.elapsed() > stale_time,
            None => true,
        }
    }

    /// What the screen should render for this snapshot
    pub fn view(&self) -> PriceView<'_> {
        match (&self.data, &self.error) {
            (Some(asset), None) => PriceView::Live { asset },
            (Some(asset), Some(error)) => PriceView::Stale { asset, error },
            (None, Some(error)) => PriceView::Unavailable { error },
            (None, None) => PriceView::Loading,
        }
    }
}

/// Rendering decision derived from a [`PriceSnapshot`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceView<'a> {
    /// Nothing loaded yet and nothing failed
    Loading,
    /// Nothing was ever loaded and the last attempt failed; show the error panel
    Unavailable { error: &'a PriceError },
    /// Fresh data
    Live { asset: &'a CanonicalAsset },
    /// Last good data with an inline warning
    Stale {
        asset: &'a CanonicalAsset,
        error: &'a PriceError,
    },
}

/// Single-writer price cell
pub struct PriceStore {
    tx: watch::Sender<PriceSnapshot>,
}

impl PriceStore {
    /// Creates an empty store
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(PriceSnapshot::empty());
        Self { tx }
    }

    /// Copies the current snapshot
    pub fn snapshot(&self) -> PriceSnapshot {
        self.tx.borrow().clone()
    }

    /// Subscribes to snapshot changes
    pub fn subscribe(&self) -> watch::Receiver<PriceSnapshot> {
        self.tx.subscribe()
    }

    /// Marks a fetch as in flight; data and error are left untouched
    pub(crate) fn mark_loading(&self) {
        self.tx.send_modify(|s| s.status = FetchStatus::Loading);
    }

    /// Replaces the current asset and clears any error
    pub(crate) fn apply_success(&self, asset: CanonicalAsset) {
        tracing::debug!(price = %asset.price_usd, "Updated XRP price");

        self.tx.send_modify(|s| {
            s.data = Some(asset);
            s.status = FetchStatus::Success;
            s.error = None;
            s.data_updated_at = Some(Utc::now());
            s.fetched_at = Some(Instant::now());
        });
    }

    /// Records a terminal failure, keeping the last good asset
    pub(crate) fn apply_failure(&self, error: PriceError) {
        self.tx.send_modify(|s| {
            s.status = FetchStatus::Error;
            s.error = Some(error);
            s.error_updated_at = Some(Utc::now());
        });
    }
}

impl Default for PriceStore {
    fn default() -> Self {
        Self::new()
    }
}
