use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    pub eth_ws_url: String,
    pub discord_webhook_url: String,
    pub etherscan_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let eth_ws_url =
            std::env::var("ETH_WS_URL").context("ETH_WS_URL must be set in .env")?;

        let discord_webhook_url = std::env::var("DISCORD_WEBHOOK_URL")
            .context("DISCORD_WEBHOOK_URL must be set in .env")?;

        let etherscan_api_key = std::env::var("ETHERSCAN_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());

        Ok(Config {
            eth_ws_url,
            discord_webhook_url,
            etherscan_api_key,
        })
    }
}
