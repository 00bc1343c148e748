use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use xrp_price_tracker::{FormattedAsset, PriceView, ProviderChain, RefreshScheduler};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let chain = ProviderChain::from_env()?;
    println!("XRP Ticker (providers: {})", chain.provider_names().join(" -> "));
    println!("==================================");

    let scheduler = Arc::new(RefreshScheduler::new(chain));
    let poller = scheduler.start();
    let mut updates = scheduler.subscribe();

    // Watch a few refresh cycles, forcing a manual refresh halfway through
    let deadline = tokio::time::sleep(Duration::from_secs(90));
    let manual_refresh = tokio::time::sleep(Duration::from_secs(45));
    tokio::pin!(deadline, manual_refresh);
    let mut manual_refresh_done = false;

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            _ = &mut manual_refresh, if !manual_refresh_done => {
                println!("\n>> Manual refresh");
                manual_refresh_done = true;
                scheduler.refetch().await;
            }
        }

        let snapshot = updates.borrow_and_update().clone();
        if snapshot.is_fetching() {
            continue;
        }

        println!("\n{:-<50}", "");
        match snapshot.view() {
            PriceView::Loading => println!("Loading XRP data..."),
            PriceView::Unavailable { error } => {
                println!("Unable to load XRP data");
                println!("  {}", error);
            }
            PriceView::Live { asset } | PriceView::Stale { asset, .. } => {
                let formatted = FormattedAsset::from(asset);
                println!("XRP  ${} USD  {} (24h)", formatted.price, formatted.change_24h);
                println!("  Market Cap:   {}", formatted.market_cap);
                println!("  Volume 24h:   {}", formatted.volume_24h);
                println!("  Supply:       {}", formatted.supply);
                println!("  Max Supply:   {}", formatted.max_supply);
                println!("  Rank:         {}", formatted.rank);
                if let Some(updated) = snapshot.data_updated_at {
                    println!("  Last updated: {}", updated.format("%H:%M:%S"));
                }
                if snapshot.is_error() {
                    println!("  Warning: data may be outdated due to API issues");
                }
            }
        }
    }

    poller.abort();
    Ok(())
}
