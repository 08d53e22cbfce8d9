use crate::Resolver;
use crate::classifier;
use crate::events::{DeploymentEvent, is_contract_creation};
use crate::notify::{self, Notifier};
use crate::rpc::RpcClient;
use alloy::consensus::Transaction as _;
use alloy_primitives::B256;
use anyhow::Result;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

const RESUBSCRIBE_DELAY: Duration = Duration::from_secs(5);
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Variant B: watches pending transactions for contract creations that
/// pass the ERC-20 conformance probe.
pub struct DeployWatcher {
    client: RpcClient,
    resolver: Arc<Resolver>,
    notifier: Notifier,
}

impl DeployWatcher {
    pub fn new(client: RpcClient, resolver: Arc<Resolver>, notifier: Notifier) -> Self {
        DeployWatcher {
            client,
            resolver,
            notifier,
        }
    }

    pub async fn run(&self) -> Result<()> {
        let mut stream = self
            .client
            .subscribe_pending_transactions()
            .await?
            .into_stream();
        info!("Subscribed to pending transactions");

        loop {
            match stream.next().await {
                Some(hash) => {
                    let client = self.client.clone();
                    let resolver = Arc::clone(&self.resolver);
                    let notifier = self.notifier.clone();
                    tokio::spawn(async move {
                        handle_pending(client, resolver, notifier, hash).await;
                    });
                }
                None => {
                    warn!(
                        "Pending-transaction subscription closed, resubscribing in {:?}",
                        RESUBSCRIBE_DELAY
                    );
                    sleep(RESUBSCRIBE_DELAY).await;
                    match self.client.subscribe_pending_transactions().await {
                        Ok(subscription) => {
                            stream = subscription.into_stream();
                            info!("Resubscribed to pending transactions");
                        }
                        Err(e) => warn!("Resubscription failed: {}", e),
                    }
                }
            }
        }
    }
}

async fn handle_pending(
    client: RpcClient,
    resolver: Arc<Resolver>,
    notifier: Notifier,
    hash: B256,
) {
    let tx = match client.get_transaction(hash).await {
        Ok(Some(tx)) => tx,
        Ok(None) => return,
        Err(e) => {
            warn!("Failed to fetch pending transaction {:?}: {}", hash, e);
            return;
        }
    };

    if !is_contract_creation(tx.to(), tx.input()) {
        return;
    }
    debug!("Contract creation pending: {:?}", hash);

    // Block on the receipt; the transaction may take a while to be mined.
    let receipt = loop {
        match client.get_transaction_receipt(hash).await {
            Ok(Some(receipt)) => break receipt,
            Ok(None) => sleep(RECEIPT_POLL_INTERVAL).await,
            Err(e) => {
                warn!("Failed to fetch receipt for {:?}: {}", hash, e);
                return;
            }
        }
    };

    let Some(contract) = receipt.contract_address else {
        debug!("Receipt for {:?} reports no created contract", hash);
        return;
    };

    if !classifier::is_erc20_conformant(&client, contract).await {
        debug!("Contract {:?} is not ERC-20 conformant", contract);
        return;
    }

    info!("New ERC-20 token deployed at {:?}", contract);
    let event = DeploymentEvent {
        contract,
        transaction_hash: hash,
    };
    let metadata = resolver.resolve(contract).await;
    let embed = notify::deployment_embed(&event, &metadata);
    notifier.send(&embed).await;
}
