use crate::models::*;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Shared price store. Written by the refresh loop, read by the metrics handler.
///
/// Every access goes through a single `RwLock`, so a reader sees either all of
/// one update batch or none of it.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<RwLock<AppStateInner>>,
}

struct AppStateInner {
    /// Configured assets, in configured order. Never changes after startup.
    assets: Vec<Asset>,
    prices: HashMap<Asset, PricePoint>,
    last_refresh: DateTime<Utc>,
}

impl AppState {
    /// Pre-populates every asset with a zero price and the refresh time with the
    /// Unix epoch, so the metrics endpoint is well-formed before the first fetch.
    pub fn new(assets: &[Asset]) -> Self {
        let prices = assets
            .iter()
            .map(|asset| (asset.clone(), PricePoint::default()))
            .collect();

        Self {
            inner: Arc::new(RwLock::new(AppStateInner {
                assets: assets.to_vec(),
                prices,
                last_refresh: DateTime::<Utc>::UNIX_EPOCH,
            })),
        }
    }

    /// Merges a fetched batch and stamps the refresh time with now.
    /// Returns how many entries were merged.
    pub async fn update(&self, prices: HashMap<Asset, PricePoint>) -> usize {
        self.apply(prices, Utc::now()).await
    }

    /// Overwrite-by-key merge. Assets missing from `prices` keep their previous
    /// value; assets that were never configured are dropped.
    pub async fn apply(
        &self,
        prices: HashMap<Asset, PricePoint>,
        refreshed_at: DateTime<Utc>,
    ) -> usize {
        let mut state = self.inner.write().await;
        let mut merged = 0;

        for (asset, point) in prices {
            match state.prices.get_mut(&asset) {
                Some(slot) => {
                    *slot = point;
                    merged += 1;
                }
                None => tracing::debug!("Ignoring unconfigured asset '{}' from upstream", asset),
            }
        }
        state.last_refresh = refreshed_at;

        merged
    }

    pub async fn snapshot(&self) -> PriceSnapshot {
        let state = self.inner.read().await;
        PriceSnapshot {
            prices: state
                .assets
                .iter()
                .map(|asset| {
                    let point = state.prices.get(asset).copied().unwrap_or_default();
                    (asset.clone(), point)
                })
                .collect(),
            last_refresh: state.last_refresh,
        }
    }
}
