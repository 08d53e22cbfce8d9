use alloy_primitives::Address;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const COINGECKO_BASE: &str = "https://api.coingecko.com/api/v3";
const ETHERSCAN_BASE: &str = "https://api.etherscan.io";
const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Best-effort market data for a token contract. Missing fields are not
/// errors, only reduced enrichment.
#[derive(Debug, Clone, Default)]
pub struct MarketInfo {
    pub icon: Option<String>,
    pub volume_usd: Option<f64>,
}

/// External metadata lookups consumed by the resolver: a primary source
/// carrying icon + volume and an optional icon-only fallback.
#[async_trait]
pub trait MetadataApi: Send + Sync {
    async fn market_info(&self, address: Address) -> Result<MarketInfo>;
    async fn fallback_icon(&self, address: Address) -> Result<String>;
    fn has_fallback(&self) -> bool;
}

#[derive(Deserialize)]
struct CoinResponse {
    image: Option<CoinImage>,
    market_data: Option<CoinMarketData>,
}

#[derive(Deserialize)]
struct CoinImage {
    small: Option<String>,
}

#[derive(Deserialize)]
struct CoinMarketData {
    total_volume: Option<CoinTotalVolume>,
}

#[derive(Deserialize)]
struct CoinTotalVolume {
    usd: Option<f64>,
}

#[derive(Deserialize)]
struct TokenInfoResponse {
    result: serde_json::Value,
}

#[derive(Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    coingecko_base: String,
    etherscan_base: String,
    etherscan_api_key: Option<String>,
}

impl MetadataClient {
    pub fn new(etherscan_api_key: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(MetadataClient {
            http,
            coingecko_base: COINGECKO_BASE.to_string(),
            etherscan_base: ETHERSCAN_BASE.to_string(),
            etherscan_api_key,
        })
    }
}

#[async_trait]
impl MetadataApi for MetadataClient {
    async fn market_info(&self, address: Address) -> Result<MarketInfo> {
        let url = format!(
            "{}/coins/ethereum/contract/{:#x}",
            self.coingecko_base, address
        );
        let body: CoinResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(MarketInfo {
            icon: body.image.and_then(|image| image.small),
            volume_usd: body
                .market_data
                .and_then(|data| data.total_volume)
                .and_then(|volume| volume.usd),
        })
    }

    async fn fallback_icon(&self, address: Address) -> Result<String> {
        let api_key = self
            .etherscan_api_key
            .as_deref()
            .ok_or_else(|| anyhow!("No Etherscan API key configured"))?;
        let url = format!(
            "{}/api?module=token&action=tokeninfo&contractaddress={:#x}&apikey={}",
            self.etherscan_base, address, api_key
        );
        let body: TokenInfoResponse = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        // `result` is a string on Etherscan errors and an array on success;
        // anything without a non-empty logo is a soft failure.
        body.result
            .as_array()
            .and_then(|tokens| tokens.first())
            .and_then(|token| token.get("logo"))
            .and_then(|logo| logo.as_str())
            .filter(|logo| !logo.is_empty())
            .map(str::to_string)
            .ok_or_else(|| anyhow!("No logo in tokeninfo response for {:?}", address))
    }

    fn has_fallback(&self) -> bool {
        self.etherscan_api_key.is_some()
    }
}
