use crate::{
    api_client::DEFAULT_BASE_URL, models::Asset,
    services::price_service::DEFAULT_REFRESH_INTERVAL,
};
use clap::Parser;
use std::time::Duration;
use thiserror::Error;

#[derive(Parser, Debug)]
#[command(name = "crypto-price-exporter", version)]
#[command(about = "Prometheus exporter for CoinGecko USD prices")]
pub struct Args {
    /// List of currencies separated by comma to fetch from CoinGecko
    #[arg(long, env = "EXPORTER_CURRENCIES", default_value = "bitcoin,ethereum,iexec-rlc")]
    pub currencies: String,

    /// Address to listen on (":PORT" listens on all interfaces)
    #[arg(long, env = "EXPORTER_LISTEN_ADDRESS", default_value = ":8080")]
    pub listen_address: String,

    /// Seconds between two price refreshes
    #[arg(long, env = "EXPORTER_REFRESH_INTERVAL", default_value_t = DEFAULT_REFRESH_INTERVAL.as_secs())]
    pub refresh_interval: u64,

    /// Base URL of the simple/price API
    #[arg(long, env = "EXPORTER_API_URL", default_value = DEFAULT_BASE_URL)]
    pub api_url: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required flag: --currencies")]
    MissingCurrencies,

    #[error("missing required flag: --listen-address")]
    MissingListenAddress,

    #[error("--refresh-interval must be greater than zero")]
    ZeroInterval,

    #[error("missing required flag: --api-url")]
    MissingApiUrl,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub assets: Vec<Asset>,
    pub listen_address: String,
    pub refresh_interval: Duration,
    pub api_url: String,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self, ConfigError> {
        let assets = parse_assets(&args.currencies);
        if assets.is_empty() {
            return Err(ConfigError::MissingCurrencies);
        }

        let listen_address = normalize_listen_address(&args.listen_address)
            .ok_or(ConfigError::MissingListenAddress)?;

        if args.refresh_interval == 0 {
            return Err(ConfigError::ZeroInterval);
        }

        let api_url = args.api_url.trim();
        if api_url.is_empty() {
            return Err(ConfigError::MissingApiUrl);
        }

        Ok(Self {
            assets,
            listen_address,
            refresh_interval: Duration::from_secs(args.refresh_interval),
            api_url: api_url.to_string(),
        })
    }
}

/// Splits on commas, dropping blanks and repeats while keeping the given order.
fn parse_assets(raw: &str) -> Vec<Asset> {
    let mut assets: Vec<Asset> = Vec::new();
    for id in raw.split(',').map(str::trim).filter(|id| !id.is_empty()) {
        if !assets.iter().any(|a| a == id) {
            assets.push(id.to_string());
        }
    }
    assets
}

fn normalize_listen_address(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        None
    } else if raw.starts_with(':') {
        Some(format!("0.0.0.0{}", raw))
    } else {
        Some(raw.to_string())
    }
}
