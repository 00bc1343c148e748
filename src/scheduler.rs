//! Background refresh scheduler
//!
//! Owns all timing around the provider chain: the periodic poll, staleness
//! revalidation, retry with backoff, and user-initiated refetches. It is the
//! only writer of the [`PriceStore`].
//!
//! ```text
//! RefreshScheduler::start()
//!     ↓
//! Background Task (polls every 30s)
//!     ↓
//! ProviderChain (CoinGecko → CoinCap)
//!     ↓
//! PriceStore (watch cell)
//!     ↓
//! Rendering layer (snapshot, subscribe, refetch)
//! ```

use crate::{
    constants::{
        INITIAL_BACKOFF_MS, MAX_BACKOFF_MS, MAX_RETRIES, REFRESH_INTERVAL_SECS, STALE_TIME_SECS,
    },
    providers::ProviderChain,
    store::{PriceSnapshot, PriceStore},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{sleep, MissedTickBehavior};

/// Timing knobs for the scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshPolicy {
    /// Period of the background poll
    pub refetch_interval: Duration,
    /// Age after which data is eligible for revalidation
    pub stale_time: Duration,
    /// Retries after a failed scheduler-driven attempt
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RefreshPolicy {
    fn default() -> Self {
        Self {
            refetch_interval: Duration::from_secs(REFRESH_INTERVAL_SECS),
            stale_time: Duration::from_secs(STALE_TIME_SECS),
            max_retries: MAX_RETRIES,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
            max_backoff: Duration::from_millis(MAX_BACKOFF_MS),
        }
    }
}

impl RefreshPolicy {
    /// Delay before retry number `attempt` (0-based): `min(initial * 2^attempt, max)`
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

#[derive(Debug, Clone, Copy)]
enum Trigger {
    Interval,
    Stale,
    User,
}

/// Drives the provider chain and publishes results to the price store
///
/// At most one fetch runs at a time. Background triggers that find a fetch in
/// flight are dropped; a user refetch waits for the in-flight fetch instead of
/// starting another.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use xrp_price_tracker::{ProviderChain, RefreshScheduler};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let scheduler = Arc::new(RefreshScheduler::new(ProviderChain::new()?));
/// let _poller = scheduler.start();
///
/// let snapshot = scheduler.refetch().await;
/// if let Some(asset) = snapshot.data {
///     println!("XRP: ${}", asset.price_usd);
/// }
/// # Ok(())
/// # }
/// ```
pub struct RefreshScheduler {
    chain: ProviderChain,
    store: PriceStore,
    policy: RefreshPolicy,
    in_flight: Mutex<()>,
}

impl RefreshScheduler {
    /// Creates a scheduler with the default policy
    pub fn new(chain: ProviderChain) -> Self {
        Self::with_policy(chain, RefreshPolicy::default())
    }

    /// Creates a scheduler with a custom policy
    pub fn with_policy(chain: ProviderChain, policy: RefreshPolicy) -> Self {
        Self {
            chain,
            store: PriceStore::new(),
            policy,
            in_flight: Mutex::new(()),
        }
    }

    pub fn policy(&self) -> &RefreshPolicy {
        &self.policy
    }

    /// Copies the current price cell
    pub fn snapshot(&self) -> PriceSnapshot {
        self.store.snapshot()
    }

    /// Subscribes to price cell updates
    pub fn subscribe(&self) -> watch::Receiver<PriceSnapshot> {
        self.store.subscribe()
    }

    /// Starts the periodic poll
    ///
    /// The first tick fires immediately and serves as the initial load. Abort
    /// the returned handle to stop polling.
    pub fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);

        tokio::spawn(async move {
            tracing::info!(
                refresh_interval_secs = scheduler.policy.refetch_interval.as_secs(),
                stale_time_secs = scheduler.policy.stale_time.as_secs(),
                "Starting XRP price refresh task"
            );

            let mut ticker = tokio::time::interval(scheduler.policy.refetch_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                scheduler.refresh_in_background().await;
            }
        })
    }

    /// Runs a scheduler-driven fetch with retries
    ///
    /// Returns `false` without fetching when another fetch is in flight.
    pub async fn refresh_in_background(&self) -> bool {
        let Ok(_guard) = self.in_flight.try_lock() else {
            tracing::debug!("Fetch already in flight, skipping scheduled refresh");
            return false;
        };

        self.run(Trigger::Interval, self.policy.max_retries).await;
        true
    }

    /// Fetches only when there is no data or it is older than the staleness window
    ///
    /// Returns whether a fetch ran.
    pub async fn revalidate_if_stale(&self) -> bool {
        let Ok(_guard) = self.in_flight.try_lock() else {
            return false;
        };

        if !self.store.snapshot().is_stale(self.policy.stale_time) {
            return false;
        }

        self.run(Trigger::Stale, self.policy.max_retries).await;
        true
    }

    /// User-initiated refresh: one immediate attempt, no backoff
    ///
    /// If a fetch is already in flight, no second fetch is started; this waits
    /// for the in-flight one to settle. Either way the settled snapshot is
    /// returned.
    pub async fn refetch(&self) -> PriceSnapshot {
        match self.in_flight.try_lock() {
            Ok(_guard) => self.run(Trigger::User, 0).await,
            Err(_) => {
                tracing::debug!("Fetch already in flight, waiting for it to settle");
                drop(self.in_flight.lock().await);
            }
        }

        self.store.snapshot()
    }

    /// Must be called with `in_flight` held
    async fn run(&self, trigger: Trigger, max_retries: u32) {
        self.store.mark_loading();

        let mut attempt = 0;
        loop {
            match self.chain.fetch_asset().await {
                Ok(asset) => {
                    self.store.apply_success(asset);
                    return;
                }
                Err(e) if attempt < max_retries => {
                    let delay = self.policy.retry_delay(attempt);
                    tracing::warn!(
                        ?trigger,
                        attempt = attempt + 1,
                        max_attempts = max_retries + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Failed to refresh XRP price, retrying"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        ?trigger,
                        attempts = attempt + 1,
                        keeps_previous = self.store.snapshot().data.is_some(),
                        error = %e,
                        "Failed to refresh XRP price"
                    );
                    self.store.apply_failure(e);
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::mock::MockProvider;
    use crate::store::{FetchStatus, PriceView};
    use crate::types::sample_asset;

    fn scheduler(primary: &Arc<MockProvider>, secondary: &Arc<MockProvider>) -> Arc<RefreshScheduler> {
        let chain = ProviderChain::with_providers(vec![primary.clone(), secondary.clone()]);
        Arc::new(RefreshScheduler::new(chain))
    }

    #[test]
    fn backoff_doubles_up_to_cap() {
        let policy = RefreshPolicy::default();

        assert_eq!(policy.retry_delay(0), Duration::from_millis(1000));
        assert_eq!(policy.retry_delay(1), Duration::from_millis(2000));
        assert_eq!(policy.retry_delay(2), Duration::from_millis(4000));
        assert_eq!(policy.retry_delay(3), Duration::from_millis(5000));
        assert_eq!(policy.retry_delay(40), Duration::from_millis(5000));
    }

    #[tokio::test]
    async fn refetch_while_in_flight_does_not_start_second_fetch() {
        let primary = Arc::new(MockProvider::gated("CoinGecko"));
        primary.push_asset(sample_asset("0.61"));
        let secondary = Arc::new(MockProvider::new("CoinCap"));
        let scheduler = scheduler(&primary, &secondary);

        let first = tokio::spawn({
            let scheduler = scheduler.clone();
            async move { scheduler.refetch().await }
        });
        while primary.call_count() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(scheduler.snapshot().is_loading());

        let second = tokio::spawn({
            let scheduler = scheduler.clone();
            async move { scheduler.refetch().await }
        });
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert!(!scheduler.refresh_in_background().await);
        assert!(!scheduler.revalidate_if_stale().await);
        assert_eq!(primary.call_count(), 1);

        primary.release();
        let first = first.await.unwrap();
        let second = second.await.unwrap();

        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 0);
        assert_eq!(first.data.unwrap().price_usd, "0.61");
        assert_eq!(second.data.unwrap().price_usd, "0.61");
        assert_eq!(second.status, FetchStatus::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_backoff_and_keeps_last_good_value() {
        let primary = Arc::new(MockProvider::new("CoinGecko"));
        primary.push_asset(sample_asset("0.61")).push_failure(503);
        let secondary = Arc::new(MockProvider::new("CoinCap"));
        secondary.push_failure(503);
        let scheduler = scheduler(&primary, &secondary);

        assert!(scheduler.refresh_in_background().await);
        assert!(scheduler.refresh_in_background().await);

        let calls = primary.call_times();
        assert_eq!(calls.len(), 4);
        assert_eq!(calls[2] - calls[1], Duration::from_millis(1000));
        assert_eq!(calls[3] - calls[2], Duration::from_millis(2000));
        assert_eq!(secondary.call_count(), 3);

        let snapshot = scheduler.snapshot();
        assert!(snapshot.is_error());
        assert_eq!(snapshot.status, FetchStatus::Error);
        assert_eq!(snapshot.data.as_ref().unwrap().price_usd, "0.61");
        assert!(matches!(snapshot.view(), PriceView::Stale { .. }));
        assert_eq!(snapshot.error.unwrap().reasons().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_that_recovers_clears_error() {
        let primary = Arc::new(MockProvider::new("CoinGecko"));
        primary.push_failure(503).push_asset(sample_asset("0.64"));
        let secondary = Arc::new(MockProvider::new("CoinCap"));
        secondary.push_failure(503);
        let scheduler = scheduler(&primary, &secondary);

        scheduler.refresh_in_background().await;

        let snapshot = scheduler.snapshot();
        assert_eq!(primary.call_count(), 2);
        assert_eq!(secondary.call_count(), 1);
        assert!(!snapshot.is_error());
        assert_eq!(snapshot.data.unwrap().price_usd, "0.64");
    }

    #[tokio::test(start_paused = true)]
    async fn terminal_failure_without_data_is_unavailable() {
        let primary = Arc::new(MockProvider::new("CoinGecko"));
        primary.push_failure(503);
        let secondary = Arc::new(MockProvider::new("CoinCap"));
        secondary.push_failure(503);
        let scheduler = scheduler(&primary, &secondary);

        scheduler.refresh_in_background().await;

        let snapshot = scheduler.snapshot();
        assert_eq!(primary.call_count(), 3);
        assert!(snapshot.data.is_none());
        assert!(matches!(snapshot.view(), PriceView::Unavailable { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn user_refetch_makes_a_single_attempt() {
        let primary = Arc::new(MockProvider::new("CoinGecko"));
        primary.push_failure(503);
        let secondary = Arc::new(MockProvider::new("CoinCap"));
        secondary.push_failure(503);
        let scheduler = scheduler(&primary, &secondary);

        let start = tokio::time::Instant::now();
        let snapshot = scheduler.refetch().await;

        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(primary.call_count(), 1);
        assert_eq!(secondary.call_count(), 1);
        assert!(snapshot.is_error());
        assert!(!snapshot.is_fetching());
    }

    #[tokio::test(start_paused = true)]
    async fn revalidates_only_after_stale_window() {
        let primary = Arc::new(MockProvider::new("CoinGecko"));
        primary.push_asset(sample_asset("0.61"));
        let secondary = Arc::new(MockProvider::new("CoinCap"));
        let scheduler = scheduler(&primary, &secondary);

        assert!(scheduler.revalidate_if_stale().await);
        assert_eq!(primary.call_count(), 1);

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(!scheduler.revalidate_if_stale().await);
        assert_eq!(primary.call_count(), 1);

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(scheduler.revalidate_if_stale().await);
        assert_eq!(primary.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn background_task_polls_on_interval() {
        let primary = Arc::new(MockProvider::new("CoinGecko"));
        primary.push_asset(sample_asset("0.61"));
        let secondary = Arc::new(MockProvider::new("CoinCap"));
        let scheduler = scheduler(&primary, &secondary);
        let mut updates = scheduler.subscribe();

        let handle = scheduler.start();

        updates
            .wait_for(|s| s.status == FetchStatus::Success)
            .await
            .unwrap();
        assert_eq!(primary.call_count(), 1);

        sleep(Duration::from_secs(29)).await;
        assert_eq!(primary.call_count(), 1);

        sleep(Duration::from_secs(2)).await;
        assert_eq!(primary.call_count(), 2);

        handle.abort();
    }
}
