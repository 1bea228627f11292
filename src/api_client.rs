use crate::models::{Asset, PricePoint};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3/simple/price";
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// One entry of the upstream body. Listed coins without a quote come back as `{}`.
#[derive(Deserialize)]
struct Quote {
    usd: Option<f64>,
}

/// CoinGecko `simple/price` client. One request fetches every configured asset.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Upstream returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("crypto-price-exporter/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch USD prices for `assets` in a single batched request.
    ///
    /// The response looks like `{"bitcoin": {"usd": 67820}, ...}`. Assets the
    /// upstream does not know, or knows without a USD quote, are absent from the
    /// result.
    pub async fn fetch_prices(
        &self,
        assets: &[Asset],
    ) -> Result<HashMap<Asset, PricePoint>, ApiError> {
        let url = format!(
            "{}?ids={}&vs_currencies=USD",
            self.base_url,
            assets.join(",")
        );

        let response = self
            .client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status));
        }

        let quotes = response
            .json::<HashMap<Asset, Quote>>()
            .await
            .map_err(|e| ApiError::ParseError(e.to_string()))?;

        Ok(quotes
            .into_iter()
            .filter_map(|(asset, quote)| match quote.usd {
                Some(usd) => Some((asset, PricePoint::new(usd))),
                None => {
                    tracing::debug!("No USD quote for '{}', keeping previous value", asset);
                    None
                }
            })
            .collect())
    }
}
