use crate::Resolver;
use crate::classifier;
use crate::events::{MintEvent, Transfer, mint_from_log};
use crate::notify::{self, Notifier};
use crate::rpc::RpcClient;
use alloy::sol_types::SolEvent;
use anyhow::Result;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);

/// Variant A: watches each new block for ERC-20 Transfers from the zero
/// address and notifies once per detected mint.
pub struct MintWatcher {
    client: RpcClient,
    resolver: Arc<Resolver>,
    notifier: Notifier,
}

impl MintWatcher {
    pub fn new(client: RpcClient, resolver: Arc<Resolver>, notifier: Notifier) -> Self {
        MintWatcher {
            client,
            resolver,
            notifier,
        }
    }

    /// Runs forever. Failing to establish the initial subscription is
    /// fatal; a subscription that later drops is re-established after a
    /// fixed delay, without bound.
    pub async fn run(&self) -> Result<()> {
        let mut stream = self.client.subscribe_blocks().await?.into_stream();
        info!("Subscribed to new block headers");

        loop {
            match stream.next().await {
                Some(header) => {
                    if let Err(e) = self.process_block(header.number).await {
                        warn!("Failed to process block {}: {}", header.number, e);
                    }
                }
                None => {
                    warn!(
                        "Block subscription closed, resubscribing in {:?}",
                        RESUBSCRIBE_DELAY
                    );
                    sleep(RESUBSCRIBE_DELAY).await;
                    match self.client.subscribe_blocks().await {
                        Ok(subscription) => {
                            stream = subscription.into_stream();
                            info!("Resubscribed to new block headers");
                        }
                        Err(e) => warn!("Resubscription failed: {}", e),
                    }
                }
            }
        }
    }

    async fn process_block(&self, block_number: u64) -> Result<()> {
        let logs = self
            .client
            .logs_for_block(block_number, Transfer::SIGNATURE_HASH)
            .await?;
        info!(
            "Block {}: {} transfer log(s)",
            block_number,
            logs.len()
        );

        for log in logs {
            match mint_from_log(&log) {
                Ok(Some(event)) => {
                    let client = self.client.clone();
                    let resolver = Arc::clone(&self.resolver);
                    let notifier = self.notifier.clone();
                    // One independent task per mint, no ordering between them.
                    tokio::spawn(async move {
                        handle_mint(client, resolver, notifier, event).await;
                    });
                }
                Ok(None) => {}
                Err(e) => warn!("Failed to decode transfer log: {}", e),
            }
        }

        Ok(())
    }
}

async fn handle_mint(
    client: RpcClient,
    resolver: Arc<Resolver>,
    notifier: Notifier,
    event: MintEvent,
) {
    info!(
        "Mint on {:?}: {} base units to {:?}",
        event.contract, event.amount, event.recipient
    );

    let metadata = resolver.resolve(event.contract).await;
    let recipient_has_code = classifier::has_deployed_code(&client, event.recipient).await;
    let embed = notify::mint_embed(
        &event,
        &metadata,
        notify::recipient_kind_label(recipient_has_code),
    );
    notifier.send(&embed).await;
}
