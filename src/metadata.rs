use crate::data_sources::MetadataApi;
use crate::rpc::ChainSource;
use alloy_primitives::{Address, U256};
use alloy_primitives::utils::format_units;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Resolved token metadata. Icon and volume stay `None` when neither
/// external source produced them; display code renders that as "N/A".
#[derive(Debug, Clone, PartialEq)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: Option<u8>,
    pub total_supply: Option<String>,
    pub icon: Option<String>,
    pub volume_usd: Option<f64>,
}

impl TokenMetadata {
    /// Placeholder returned when the on-chain reads fail. Never cached,
    /// so a later resolve gets another attempt.
    pub fn unknown() -> Self {
        TokenMetadata {
            name: "Unknown".to_string(),
            symbol: "Unknown".to_string(),
            decimals: None,
            total_supply: None,
            icon: None,
            volume_usd: None,
        }
    }

    pub fn icon_label(&self) -> &str {
        self.icon.as_deref().unwrap_or("N/A")
    }

    pub fn volume_label(&self) -> String {
        match self.volume_usd {
            Some(volume) => format!("${:.2}", volume),
            None => "N/A".to_string(),
        }
    }
}

/// Which on-chain fields a resolution needs: mint notifications only show
/// name/symbol, deployment notifications also show decimals and supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveScope {
    Basic,
    Full,
}

pub struct MetadataResolver<C, A> {
    chain: C,
    api: A,
    scope: ResolveScope,
    // Process-lifetime memoization, unbounded and never evicted. The lock
    // is held only across get/insert, so two concurrent resolutions of a
    // brand-new address may both do the external lookups.
    cache: RwLock<HashMap<Address, TokenMetadata>>,
}

impl<C: ChainSource, A: MetadataApi> MetadataResolver<C, A> {
    pub fn new(chain: C, api: A, scope: ResolveScope) -> Self {
        MetadataResolver {
            chain,
            api,
            scope,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Never fails: degrades to a placeholder on chain failure and to
    /// "N/A" enrichment when both metadata APIs are unavailable.
    pub async fn resolve(&self, address: Address) -> TokenMetadata {
        if let Some(cached) = self.cache.read().await.get(&address) {
            debug!("Metadata cache hit for {:?}", address);
            return cached.clone();
        }

        let mut metadata = match self.fetch_onchain(address).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!("On-chain metadata read failed for {:?}: {}", address, e);
                return TokenMetadata::unknown();
            }
        };

        match self.api.market_info(address).await {
            Ok(info) => {
                metadata.icon = info.icon;
                metadata.volume_usd = info.volume_usd;
            }
            Err(e) => {
                debug!("Primary metadata lookup failed for {:?}: {}", address, e);
                if self.api.has_fallback() {
                    match self.api.fallback_icon(address).await {
                        Ok(icon) => metadata.icon = Some(icon),
                        Err(e) => {
                            debug!("Fallback metadata lookup failed for {:?}: {}", address, e)
                        }
                    }
                }
            }
        }

        self.cache
            .write()
            .await
            .insert(address, metadata.clone());
        metadata
    }

    async fn fetch_onchain(&self, address: Address) -> anyhow::Result<TokenMetadata> {
        let (name, symbol) = tokio::join!(
            self.chain.token_name(address),
            self.chain.token_symbol(address),
        );
        let mut metadata = TokenMetadata {
            name: name?,
            symbol: symbol?,
            decimals: None,
            total_supply: None,
            icon: None,
            volume_usd: None,
        };

        if self.scope == ResolveScope::Full {
            let (decimals, total_supply) = tokio::join!(
                self.chain.token_decimals(address),
                self.chain.token_total_supply(address),
            );
            let decimals = decimals?;
            metadata.total_supply = Some(format_token_amount(total_supply?, decimals));
            metadata.decimals = Some(decimals);
        }

        Ok(metadata)
    }
}

/// Renders base units as a decimal token amount with trailing zeros
/// trimmed but at least one fractional digit, e.g. 10^18 @ 18 -> "1.0".
pub fn format_token_amount(value: U256, decimals: u8) -> String {
    let rendered = format_units(value, decimals).unwrap_or_else(|_| value.to_string());
    match rendered.split_once('.') {
        Some((whole, frac)) => {
            let frac = frac.trim_end_matches('0');
            if frac.is_empty() {
                format!("{}.0", whole)
            } else {
                format!("{}.{}", whole, frac)
            }
        }
        None => rendered,
    }
}
