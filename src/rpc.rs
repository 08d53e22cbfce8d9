use crate::events::{decimalsCall, nameCall, symbolCall, totalSupplyCall};
use alloy::providers::fillers::FillProvider;
use alloy::providers::{Provider, ProviderBuilder, WsConnect};
use alloy::pubsub::Subscription;
use alloy::rpc::types::{Filter, Header, Log, Transaction, TransactionInput, TransactionReceipt, TransactionRequest};
use alloy::sol_types::SolCall;
use alloy_primitives::{Address, B256, Bytes, TxKind, U256};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;

type AlloyFullProvider = FillProvider<
    alloy::providers::fillers::JoinFill<
        alloy::providers::Identity,
        alloy::providers::fillers::JoinFill<
            alloy::providers::fillers::GasFiller,
            alloy::providers::fillers::JoinFill<
                alloy::providers::fillers::BlobGasFiller,
                alloy::providers::fillers::JoinFill<
                    alloy::providers::fillers::NonceFiller,
                    alloy::providers::fillers::ChainIdFiller,
                >,
            >,
        >,
    >,
    alloy::providers::RootProvider,
>;

#[derive(Clone)]
pub struct RpcClient {
    provider: Arc<AlloyFullProvider>,
}

impl RpcClient {
    pub async fn connect(ws_url: &str) -> Result<Self> {
        let ws = WsConnect::new(ws_url);
        let provider = ProviderBuilder::new()
            .connect_ws(ws)
            .await
            .with_context(|| format!("Failed to connect to {}", ws_url))?;

        Ok(RpcClient {
            provider: Arc::new(provider),
        })
    }

    pub async fn subscribe_blocks(&self) -> Result<Subscription<Header>> {
        Ok(self.provider.subscribe_blocks().await?)
    }

    pub async fn subscribe_pending_transactions(&self) -> Result<Subscription<B256>> {
        Ok(self.provider.subscribe_pending_transactions().await?)
    }

    /// Logs for a single block, filtered by event signature only. Mint
    /// detection listens to every contract, so no address filter.
    pub async fn logs_for_block(&self, block_number: u64, topic0: B256) -> Result<Vec<Log>> {
        let filter = Filter::new()
            .select(block_number)
            .event_signature(topic0);
        Ok(self.provider.get_logs(&filter).await?)
    }

    pub async fn get_code(&self, address: Address) -> Result<Bytes> {
        Ok(self.provider.get_code_at(address).await?)
    }

    pub async fn get_transaction(&self, hash: B256) -> Result<Option<Transaction>> {
        Ok(self.provider.get_transaction_by_hash(hash).await?)
    }

    pub async fn get_transaction_receipt(&self, hash: B256) -> Result<Option<TransactionReceipt>> {
        Ok(self.provider.get_transaction_receipt(hash).await?)
    }

    pub async fn call_contract<C: SolCall>(&self, address: Address, call: C) -> Result<C::Return> {
        let request = TransactionRequest {
            to: Some(TxKind::Call(address)),
            input: TransactionInput::new(call.abi_encode().into()),
            ..Default::default()
        };
        let output = self.provider.call(request).await?;
        let decoded = C::abi_decode_returns(&output)?;
        Ok(decoded)
    }
}

/// Read-only chain access consumed by the classifier and the resolver.
/// Exists so both can be exercised against in-memory fakes.
#[async_trait]
pub trait ChainSource: Send + Sync {
    async fn code_at(&self, address: Address) -> Result<Bytes>;
    async fn token_name(&self, address: Address) -> Result<String>;
    async fn token_symbol(&self, address: Address) -> Result<String>;
    async fn token_decimals(&self, address: Address) -> Result<u8>;
    async fn token_total_supply(&self, address: Address) -> Result<U256>;
}

#[async_trait]
impl ChainSource for RpcClient {
    async fn code_at(&self, address: Address) -> Result<Bytes> {
        self.get_code(address).await
    }

    async fn token_name(&self, address: Address) -> Result<String> {
        self.call_contract(address, nameCall {}).await
    }

    async fn token_symbol(&self, address: Address) -> Result<String> {
        self.call_contract(address, symbolCall {}).await
    }

    async fn token_decimals(&self, address: Address) -> Result<u8> {
        self.call_contract(address, decimalsCall {}).await
    }

    async fn token_total_supply(&self, address: Address) -> Result<U256> {
        self.call_contract(address, totalSupplyCall {}).await
    }
}
