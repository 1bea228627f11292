use crate::{api_client::ApiClient, models::Asset, state::AppState};
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Fetching,
    Sleeping,
    Stopped,
}

/// Poll the upstream every `interval` until `shutdown` fires.
///
/// A failed fetch leaves the store untouched and is retried on the next tick,
/// with no backoff. Cancellation wins over both an in-flight fetch and a timer
/// that fires at the same moment, so nothing is fetched or written after it.
pub async fn start_price_polling(
    state: AppState,
    api_client: ApiClient,
    assets: Vec<Asset>,
    interval: Duration,
    shutdown: CancellationToken,
) {
    info!(
        "Starting price polling for [{}] every {}s",
        assets.join(", "),
        interval.as_secs_f64()
    );

    let mut phase = RefreshPhase::Fetching;

    loop {
        phase = match phase {
            RefreshPhase::Fetching => {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => RefreshPhase::Stopped,
                    result = api_client.fetch_prices(&assets) => match result {
                        Ok(_) if shutdown.is_cancelled() => RefreshPhase::Stopped,
                        Ok(prices) => {
                            let received = prices.len();
                            let merged = state.update(prices).await;
                            info!("Refreshed {} of {} prices ({} received)", merged, assets.len(), received);
                            RefreshPhase::Sleeping
                        }
                        Err(e) => {
                            // Retry on the next tick
                            error!("Failed to fetch prices: {}", e);
                            RefreshPhase::Sleeping
                        }
                    },
                }
            }
            RefreshPhase::Sleeping => {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => RefreshPhase::Stopped,
                    _ = time::sleep(interval) => RefreshPhase::Fetching,
                }
            }
            RefreshPhase::Stopped => break,
        };
    }

    info!("Price polling stopped");
}
