use chrono::{DateTime, Utc};

pub type Asset = String;

/// Latest known USD value for one asset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PricePoint {
    pub usd: f64,
}

impl PricePoint {
    pub fn new(usd: f64) -> Self {
        Self { usd }
    }
}

/// Read-only copy of the price store, ordered like the configured asset list.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub prices: Vec<(Asset, PricePoint)>,
    pub last_refresh: DateTime<Utc>,
}

impl PriceSnapshot {
    #[cfg(test)]
    pub fn get(&self, asset: &str) -> Option<PricePoint> {
        self.prices
            .iter()
            .find(|(a, _)| a == asset)
            .map(|(_, p)| *p)
    }
}
