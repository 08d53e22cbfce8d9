use anyhow::Result;
use erc20_sentry::config::Config;
use erc20_sentry::data_sources::MetadataClient;
use erc20_sentry::deploy_watcher::DeployWatcher;
use erc20_sentry::metadata::{MetadataResolver, ResolveScope};
use erc20_sentry::notify::Notifier;
use erc20_sentry::rpc::RpcClient;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    info!("Starting ERC-20 deployment watcher");

    let config = Config::from_env()?;
    info!("Configuration loaded");
    info!(
        "Etherscan fallback: {}",
        if config.etherscan_api_key.is_some() {
            "enabled"
        } else {
            "disabled"
        }
    );

    let client = RpcClient::connect(&config.eth_ws_url).await?;
    info!("Connected to {}", config.eth_ws_url);

    let api = MetadataClient::new(config.etherscan_api_key.clone())?;
    let resolver = Arc::new(MetadataResolver::new(
        client.clone(),
        api,
        ResolveScope::Full,
    ));
    let notifier = Notifier::new(config.discord_webhook_url.clone())?;

    let watcher = DeployWatcher::new(client, resolver, notifier);

    if let Err(e) = watcher.run().await {
        error!("Watcher error: {}", e);
        return Err(e);
    }

    Ok(())
}
